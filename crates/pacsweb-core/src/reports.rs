//! Report structures and their table shaping

use serde::{Deserialize, Serialize};

use crate::money::MoneyFormatter;
use crate::months::{Period, YearMonth};
use crate::types::{Account, Balance, Currency, Money, Pk};

/// Balance of an account at the end of each month of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEvolutionData {
    pub account: Pk,
    #[serde(rename = "initial_balance", alias = "initialBalance", default)]
    pub initial_balance: Balance,
    #[serde(rename = "balance_evolution", alias = "balanceEvolution")]
    pub balance_evolution: Vec<Balance>,
}

/// Moneys that went through an account during a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub period: Period,
    pub moneys: Vec<Money>,
}

/// All flows of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountFlows {
    pub account: Pk,
    pub flows: Vec<Flow>,
}

/// A rendered report: a header and rows of text cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Balance of one account at one date, as shown in a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub date: String,
    pub account: Pk,
    pub balance: Balance,
}

/// Cell of a date by account table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellData {
    pub x_label: String,
    pub y_label: String,
    pub value: String,
}

fn account_name<'a, G>(get_account: &G, pk: Pk) -> String
where
    G: Fn(Pk) -> Option<&'a Account>,
{
    get_account(pk)
        .map(|a| a.name.clone())
        .unwrap_or_else(|| format!("?{}", pk))
}

/// Date becomes the x label, the account name the y label
pub fn to_cell_data<'a, GA, GC>(
    get_account: GA,
    get_currency: GC,
    formatter: &MoneyFormatter,
    data: &AccountBalance,
) -> CellData
where
    GA: Fn(Pk) -> Option<&'a Account>,
    GC: Fn(Pk) -> Option<&'a Currency>,
{
    CellData {
        x_label: data.date.clone(),
        y_label: account_name(&get_account, data.account),
        value: formatter.moneys(get_currency, &data.balance),
    }
}

/// `Account | <month labels>` with one row of balances per account
pub fn balance_evolution_table<'a, GA, GC>(
    months: &[YearMonth],
    data: &[BalanceEvolutionData],
    get_account: GA,
    get_currency: GC,
    formatter: &MoneyFormatter,
) -> ReportTable
where
    GA: Fn(Pk) -> Option<&'a Account>,
    GC: Fn(Pk) -> Option<&'a Currency>,
{
    let header = std::iter::once("Account".to_string())
        .chain(months.iter().map(YearMonth::to_label))
        .collect();
    let rows = data
        .iter()
        .map(|entry| {
            std::iter::once(account_name(&get_account, entry.account))
                .chain(
                    entry
                        .balance_evolution
                        .iter()
                        .map(|balance| formatter.moneys(&get_currency, balance)),
                )
                .collect()
        })
        .collect();
    ReportTable { header, rows }
}

/// Label of the month a period starts in
pub fn period_to_label(period: &Period) -> String {
    YearMonth::from_period(period)
        .map(|m| m.to_label())
        .unwrap_or_else(|| period.0.to_string())
}

/// `Account | <period labels>` with one row of flows per account
pub fn flow_evolution_table<'a, GA, GC>(
    periods: &[Period],
    data: &[AccountFlows],
    get_account: GA,
    get_currency: GC,
    formatter: &MoneyFormatter,
) -> ReportTable
where
    GA: Fn(Pk) -> Option<&'a Account>,
    GC: Fn(Pk) -> Option<&'a Currency>,
{
    let header = std::iter::once("Account".to_string())
        .chain(periods.iter().map(period_to_label))
        .collect();
    let rows = data
        .iter()
        .map(|entry| {
            std::iter::once(account_name(&get_account, entry.account))
                .chain(
                    entry
                        .flows
                        .iter()
                        .map(|flow| formatter.moneys(&get_currency, &flow.moneys)),
                )
                .collect()
        })
        .collect();
    ReportTable { header, rows }
}
