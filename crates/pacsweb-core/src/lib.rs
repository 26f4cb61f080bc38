//! Core ledger domain and business logic
//!
//! Pure functions over data already fetched from the ledger API: the account
//! hierarchy, money formatting, month arithmetic, journal and report shaping,
//! and the form values the user fills before a request is made.

pub mod accounts;
pub mod dates;
pub mod error;
pub mod features;
pub mod forms;
pub mod journal;
pub mod money;
pub mod months;
pub mod reports;
pub mod secrets;
pub mod types;

use serde::{Deserialize, Serialize};

pub use accounts::{AccountTreeNode, HasPk, Lookup};
pub use error::{CoreError, CoreResult, ErrorCode};
pub use features::FeatureFlags;
pub use journal::{JournalData, JournalPage, JournalRow, Pagination};
pub use money::MoneyFormatter;
pub use months::{Month, Period, YearMonth};
pub use reports::{AccountFlows, BalanceEvolutionData, Flow, ReportTable};
pub use secrets::Secrets;
pub use types::{AccType, Account, Balance, Currency, Money, Movement, Pk, Tag, Transaction};

// ==================== Ledger Snapshot ====================

/// Everything the views share: accounts, currencies and the most recent
/// transactions, as fetched when the application starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: Vec<Account>,
    pub currencies: Vec<Currency>,
    pub transactions: Vec<Transaction>,
}

impl LedgerSnapshot {
    pub fn new(accounts: Vec<Account>, currencies: Vec<Currency>, transactions: Vec<Transaction>) -> Self {
        Self {
            accounts,
            currencies,
            transactions,
        }
    }

    pub fn account_lookup(&self) -> Lookup<'_, Account> {
        Lookup::new(&self.accounts)
    }

    pub fn currency_lookup(&self) -> Lookup<'_, Currency> {
        Lookup::new(&self.currencies)
    }

    pub fn account(&self, pk: Pk) -> CoreResult<&Account> {
        self.accounts
            .iter()
            .find(|a| a.pk == pk)
            .ok_or(CoreError::AccountNotFound { pk })
    }

    pub fn currency(&self, pk: Pk) -> CoreResult<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.pk == pk)
            .ok_or(CoreError::CurrencyNotFound { pk })
    }

    /// Finds a currency by its code, ignoring case
    pub fn currency_by_name(&self, name: &str) -> Option<&Currency> {
        self.currencies
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn is_descendant(&self, a: &Account, b: &Account) -> bool {
        accounts::is_descendant(&self.accounts, a, b)
    }

    pub fn tree(&self) -> CoreResult<AccountTreeNode> {
        accounts::account_tree(&self.accounts)
    }

    /// Moneys moved by the loaded transactions on `account` and its
    /// descendants, summed per currency
    pub fn balance_for_account(&self, account: &Account) -> Vec<Money> {
        let lookup = self.account_lookup();
        let moneys: Vec<Money> = self
            .transactions
            .iter()
            .flat_map(|transaction| {
                accounts::extract_moneys_for_account(
                    |pk| lookup.get(pk),
                    |a, b| self.is_descendant(a, b),
                    account,
                    &transaction.movements,
                )
            })
            .collect();
        money::sum_moneys(&moneys)
    }

    pub fn moneys_repr(&self, formatter: &MoneyFormatter, moneys: &[Money]) -> String {
        let lookup = self.currency_lookup();
        formatter.moneys(|pk| lookup.get(pk), moneys)
    }

    /// Journal rows of `account` for one page of journal data
    pub fn journal_rows(
        &self,
        account: &Account,
        formatter: &MoneyFormatter,
        data: &JournalData,
    ) -> Vec<JournalRow> {
        let account_lookup = self.account_lookup();
        let currency_lookup = self.currency_lookup();
        journal::journal_rows(
            account,
            |pk| account_lookup.get(pk),
            |a, b| self.is_descendant(a, b),
            |pk| currency_lookup.get(pk),
            formatter,
            data,
        )
    }

    pub fn balance_evolution_table(
        &self,
        months: &[YearMonth],
        data: &[BalanceEvolutionData],
        formatter: &MoneyFormatter,
    ) -> ReportTable {
        let account_lookup = self.account_lookup();
        let currency_lookup = self.currency_lookup();
        reports::balance_evolution_table(
            months,
            data,
            |pk| account_lookup.get(pk),
            |pk| currency_lookup.get(pk),
            formatter,
        )
    }

    pub fn flow_evolution_table(
        &self,
        periods: &[Period],
        data: &[AccountFlows],
        formatter: &MoneyFormatter,
    ) -> ReportTable {
        let account_lookup = self.account_lookup();
        let currency_lookup = self.currency_lookup();
        reports::flow_evolution_table(
            periods,
            data,
            |pk| account_lookup.get(pk),
            |pk| currency_lookup.get(pk),
            formatter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn snapshot() -> LedgerSnapshot {
        let accounts = vec![
            Account { pk: 1, name: "Root".into(), acc_type: AccType::Root, parent: None },
            Account { pk: 2, name: "Assets".into(), acc_type: AccType::Branch, parent: Some(1) },
            Account { pk: 3, name: "Bank".into(), acc_type: AccType::Leaf, parent: Some(2) },
            Account { pk: 4, name: "Wallet".into(), acc_type: AccType::Leaf, parent: Some(2) },
            Account { pk: 5, name: "Expenses".into(), acc_type: AccType::Leaf, parent: Some(1) },
        ];
        let currencies = vec![
            Currency { pk: 1, name: "EUR".into(), imutable: false },
            Currency { pk: 2, name: "USD".into(), imutable: false },
        ];
        let movement = |account, currency, q: i64| Movement {
            account,
            money: Money::new(currency, Decimal::from(q)),
            comment: None,
        };
        let transactions = vec![
            Transaction {
                pk: 1,
                description: "Withdraw".into(),
                reference: None,
                date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                movements: vec![movement(3, 1, -50), movement(4, 1, 50)],
                tags: vec![],
            },
            Transaction {
                pk: 2,
                description: "Lunch".into(),
                reference: None,
                date: NaiveDate::from_ymd_opt(2019, 1, 2).unwrap(),
                movements: vec![movement(4, 2, -12), movement(5, 2, 12)],
                tags: vec![],
            },
        ];
        LedgerSnapshot::new(accounts, currencies, transactions)
    }

    #[test]
    fn test_lookups() {
        let snapshot = snapshot();
        assert_eq!(snapshot.account(3).unwrap().name, "Bank");
        assert!(matches!(snapshot.account(30), Err(CoreError::AccountNotFound { pk: 30 })));
        assert!(matches!(snapshot.currency(9), Err(CoreError::CurrencyNotFound { pk: 9 })));
        assert_eq!(snapshot.currency_by_name("usd").map(|c| c.pk), Some(2));
    }

    #[test]
    fn test_balance_for_account() {
        let snapshot = snapshot();
        let assets = snapshot.account(2).unwrap().clone();
        let balance = snapshot.balance_for_account(&assets);
        assert_eq!(
            snapshot.moneys_repr(&MoneyFormatter::default(), &balance),
            "+0.00 EUR; -12.00 USD"
        );
        let expenses = snapshot.account(5).unwrap().clone();
        assert_eq!(
            snapshot.balance_for_account(&expenses),
            vec![Money::new(2, Decimal::from(12))]
        );
    }

    #[test]
    fn test_tree() {
        let snapshot = snapshot();
        let tree = snapshot.tree().unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.children.len(), 2);
    }
}
