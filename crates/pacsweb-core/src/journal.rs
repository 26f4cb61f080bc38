//! Account journal pages and table rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::extract_moneys_for_account;
use crate::money::MoneyFormatter;
use crate::types::{Account, Balance, Currency, Pk, Transaction};

/// Default number of journal entries per page
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Page selection as the user sees it: `page` starts at 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// The server numbers pages from 1. The last page number stays put
    /// instead of wrapping around to the first page.
    pub fn server_page(&self) -> u32 {
        self.page.saturating_add(1)
    }

    /// Number of pages needed for `count` entries
    pub fn page_count(&self, count: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        count.div_ceil(self.page_size as u64)
    }
}

/// Transactions of an account with the balance after each one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalData {
    pub transactions: Vec<Transaction>,
    pub balances: Vec<Balance>,
}

/// One page of an account journal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalPage {
    pub count: u64,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    pub results: JournalData,
}

/// Column headers of the journal table
pub const JOURNAL_COLUMNS: [&str; 5] = ["Pk", "Description", "Date", "Quantity", "Balance After"];

/// A rendered journal table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalRow {
    pub pk: Pk,
    pub description: String,
    pub date: NaiveDate,
    /// Moneys moved on the account and its descendants
    pub quantity: String,
    pub balance_after: String,
}

impl JournalRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.pk.to_string(),
            self.description.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.quantity.clone(),
            self.balance_after.clone(),
        ]
    }
}

/// Pairs transactions with balances and renders them, latest date first.
///
/// Extra transactions or balances without a counterpart are dropped.
pub fn journal_rows<'a, GA, D, GC>(
    account: &Account,
    get_account: GA,
    is_descendant: D,
    get_currency: GC,
    formatter: &MoneyFormatter,
    data: &JournalData,
) -> Vec<JournalRow>
where
    GA: Fn(Pk) -> Option<&'a Account>,
    D: Fn(&Account, &Account) -> bool,
    GC: Fn(Pk) -> Option<&'a Currency>,
{
    if data.transactions.len() != data.balances.len() {
        log::warn!(
            "Journal for account {} has {} transactions and {} balances",
            account.pk,
            data.transactions.len(),
            data.balances.len()
        );
    }
    let mut rows: Vec<JournalRow> = data
        .transactions
        .iter()
        .zip(data.balances.iter())
        .map(|(transaction, balance)| {
            let moneys =
                extract_moneys_for_account(&get_account, &is_descendant, account, &transaction.movements);
            JournalRow {
                pk: transaction.pk,
                description: transaction.description.clone(),
                date: transaction.date,
                quantity: formatter.moneys(&get_currency, &moneys),
                balance_after: formatter.moneys(&get_currency, balance),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{is_descendant, Lookup};
    use crate::types::{AccType, Money, Movement};
    use rust_decimal::Decimal;

    fn transaction(pk: Pk, date: &str, movements: Vec<(Pk, i64)>) -> Transaction {
        Transaction {
            pk,
            description: format!("t{}", pk),
            reference: None,
            date: date.parse().unwrap(),
            movements: movements
                .into_iter()
                .map(|(account, q)| Movement {
                    account,
                    money: Money::new(1, Decimal::from(q)),
                    comment: None,
                })
                .collect(),
            tags: vec![],
        }
    }

    #[test]
    fn test_pagination() {
        let pagination = Pagination::new(2, 22);
        assert_eq!(pagination.server_page(), 3);
        assert_eq!(pagination.page_count(45), 3);
        assert_eq!(pagination.page_count(44), 2);
        assert_eq!(Pagination::new(0, 0).page_count(10), 0);
    }

    #[test]
    fn test_server_page_at_u32_max() {
        assert_eq!(Pagination::new(u32::MAX, 10).server_page(), u32::MAX);
        assert_eq!(Pagination::new(u32::MAX - 1, 10).server_page(), u32::MAX);
    }

    #[test]
    fn test_journal_page_from_wire() {
        let page: JournalPage = serde_json::from_value(serde_json::json!({
            "count": 1,
            "previous": null,
            "next": "http://host/accounts/1/journal/?page=2",
            "results": {"transactions": [], "balances": []}
        }))
        .unwrap();
        assert_eq!(page.count, 1);
        assert!(page.next.is_some());
    }

    #[test]
    fn test_journal_rows() {
        let accounts = vec![
            Account { pk: 1, name: "root".into(), acc_type: AccType::Root, parent: None },
            Account { pk: 2, name: "cash".into(), acc_type: AccType::Branch, parent: Some(1) },
            Account { pk: 3, name: "wallet".into(), acc_type: AccType::Leaf, parent: Some(2) },
            Account { pk: 4, name: "food".into(), acc_type: AccType::Leaf, parent: Some(1) },
        ];
        let currencies = vec![Currency { pk: 1, name: "EUR".into(), imutable: false }];
        let account_lookup = Lookup::new(&accounts);
        let currency_lookup = Lookup::new(&currencies);
        let data = JournalData {
            transactions: vec![
                transaction(10, "2019-01-01", vec![(3, 100), (4, -100)]),
                transaction(11, "2019-02-01", vec![(4, 30), (3, -30)]),
            ],
            balances: vec![
                vec![Money::new(1, Decimal::from(100))],
                vec![Money::new(1, Decimal::from(70))],
            ],
        };
        let rows = journal_rows(
            &accounts[1],
            |pk| account_lookup.get(pk),
            |a, b| is_descendant(&accounts, a, b),
            |pk| currency_lookup.get(pk),
            &MoneyFormatter::default(),
            &data,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pk, 11);
        assert_eq!(rows[0].quantity, "-30.00 EUR");
        assert_eq!(rows[0].balance_after, "+70.00 EUR");
        assert_eq!(rows[1].quantity, "+100.00 EUR");
        assert_eq!(
            rows[1].cells(),
            vec!["10", "t10", "2019-01-01", "+100.00 EUR", "+100.00 EUR"]
        );
    }
}
