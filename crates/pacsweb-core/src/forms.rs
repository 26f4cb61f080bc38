//! Form values and their validation.
//!
//! Each form is a plain struct holding what the user picked so far. Nothing
//! here talks to the network: a form either produces a request value or the
//! messages that block submission.

use chrono::NaiveDate;
use pacsweb_parser::{tags, PricePortfolio};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::months::{month_index, months_between, Month, Period, YearMonth};
use crate::reports::AccountFlows;
use crate::types::{AccType, Pk, Tag, Transaction};

pub const MONTHS_NULL_ERROR: &str = "At least one of the months is null!";
pub const MONTHS_ORDER_ERROR: &str =
    "The second date appears to come before (or is equal to) the first.";
pub const ACCOUNTS_NULL_ERROR: &str = "At least one of the accounts is not set!";
pub const ACCOUNTS_EMPTY_ERROR: &str = "At least one account is needed.";
pub const ALREADY_LOADING_ERROR: &str = "Already loading!";

fn unknown_month_error(name: &str) -> String {
    format!("Unkown month {:?}", name)
}

// ==================== Transaction ====================

/// A movement being typed; every field may still be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementSpec {
    pub account: Option<Pk>,
    pub currency: Option<Pk>,
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A complete movement as sent to the server, before wire remapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRequest {
    pub account: Pk,
    pub currency: Pk,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A validated transaction form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub description: String,
    pub reference: Option<String>,
    pub date: NaiveDate,
    pub movements: Vec<MovementRequest>,
    pub tags: Vec<Tag>,
}

/// Transaction form value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSpec {
    pub description: String,
    pub reference: Option<String>,
    pub date: Option<NaiveDate>,
    pub movements: Vec<MovementSpec>,
    /// Raw tags input, `foo:bar baz:boz`
    pub tags_input: Option<String>,
}

impl Default for TransactionSpec {
    fn default() -> Self {
        Self {
            description: String::new(),
            reference: None,
            date: None,
            movements: vec![MovementSpec::default(), MovementSpec::default()],
            tags_input: None,
        }
    }
}

impl TransactionSpec {
    /// Form pre-filled with an existing transaction
    pub fn from_transaction(transaction: &Transaction) -> Self {
        let movements = transaction
            .movements
            .iter()
            .map(|m| MovementSpec {
                account: Some(m.account),
                currency: Some(m.money.currency),
                quantity: Some(m.money.quantity),
                comment: m.comment.clone(),
            })
            .collect();
        Self {
            description: transaction.description.clone(),
            reference: transaction.reference.clone(),
            date: Some(transaction.date),
            movements,
            tags_input: Some(tags::to_user_input(&transaction.tags)),
        }
    }

    /// Like [`TransactionSpec::from_transaction`] without the date, to use an
    /// existing transaction as a template for a new one
    pub fn template_from(transaction: &Transaction) -> Self {
        Self {
            date: None,
            ..Self::from_transaction(transaction)
        }
    }

    pub fn add_movement(&mut self) {
        self.movements.push(MovementSpec::default());
    }

    /// Removes a movement. The first two movements cannot be removed.
    pub fn remove_movement(&mut self, index: usize) -> bool {
        if index <= 1 || index >= self.movements.len() {
            return false;
        }
        self.movements.remove(index);
        true
    }

    pub fn is_last_movement(&self, index: usize) -> bool {
        index + 1 == self.movements.len()
    }

    /// Copies the currency of movement `index` to the next one
    pub fn copy_currency_to_next(&mut self, index: usize) -> bool {
        if index + 1 >= self.movements.len() {
            return false;
        }
        self.movements[index + 1].currency = self.movements[index].currency;
        true
    }

    /// Copies the quantity of movement `index` to the next one, negated
    pub fn copy_quantity_to_next(&mut self, index: usize) -> bool {
        if index + 1 >= self.movements.len() {
            return false;
        }
        self.movements[index + 1].quantity = self.movements[index].quantity.map(|q| -q);
        true
    }

    /// Validates the form, collecting every problem found
    pub fn to_request(&self) -> CoreResult<TransactionRequest> {
        let mut errors = vec![];

        if self.description.trim().is_empty() {
            errors.push("Missing description".to_string());
        }
        if self.date.is_none() {
            errors.push("Missing date".to_string());
        }
        if self.movements.len() < 2 {
            errors.push("At least two movements are needed.".to_string());
        }

        let mut movements = vec![];
        for (i, movement) in self.movements.iter().enumerate() {
            match (movement.account, movement.currency, movement.quantity) {
                (Some(account), Some(currency), Some(quantity)) => movements.push(MovementRequest {
                    account,
                    currency,
                    quantity,
                    comment: movement.comment.clone().filter(|c| !c.is_empty()),
                }),
                (account, currency, quantity) => {
                    if account.is_none() {
                        errors.push(format!("Movement[{}]: missing account", i));
                    }
                    if currency.is_none() {
                        errors.push(format!("Movement[{}]: missing currency", i));
                    }
                    if quantity.is_none() {
                        errors.push(format!("Movement[{}]: missing quantity", i));
                    }
                }
            }
        }

        let tags_input = self.tags_input.as_deref();
        if let Some(message) = tags::error_message_from_user_input(tags_input) {
            errors.push(message.to_string());
        }

        match (errors.is_empty(), self.date) {
            (true, Some(date)) => Ok(TransactionRequest {
                description: self.description.clone(),
                reference: self.reference.clone().filter(|r| !r.is_empty()),
                date,
                movements,
                tags: tags::from_user_input(tags_input).unwrap_or_default(),
            }),
            _ => Err(CoreError::Validation { messages: errors }),
        }
    }
}

// ==================== Account ====================

/// Account form value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSpec {
    pub name: String,
    pub acc_type: Option<AccType>,
    pub parent: Option<Pk>,
}

impl AccountSpec {
    pub fn validate(&self) -> CoreResult<()> {
        let mut errors = vec![];
        if self.name.trim().is_empty() {
            errors.push("Missing name".to_string());
        }
        match self.acc_type {
            None => errors.push("Missing account type".to_string()),
            Some(AccType::Root) => {}
            Some(_) if self.parent.is_none() => {
                errors.push("Non root accounts need a parent".to_string())
            }
            Some(_) => {}
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation { messages: errors })
        }
    }
}

// ==================== Month Range Reports ====================

/// A month as picked by the user, name not yet checked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthInput {
    pub month: String,
    pub year: i32,
}

impl MonthInput {
    pub fn new(month: impl Into<String>, year: i32) -> Self {
        Self {
            month: month.into(),
            year,
        }
    }

    fn resolve(&self) -> Option<YearMonth> {
        let month = month_index(&self.month).and_then(Month::from_index)?;
        Some(YearMonth::new(month, self.year))
    }
}

impl From<YearMonth> for MonthInput {
    fn from(value: YearMonth) -> Self {
        Self::new(value.month.name(), value.year)
    }
}

/// Checks the two picked months: both set, known, and strictly ordered.
pub fn validate_months(months: &[Option<MonthInput>]) -> Option<String> {
    if months.iter().any(Option::is_none) {
        return Some(MONTHS_NULL_ERROR.to_string());
    }
    let months: Vec<&MonthInput> = months.iter().flatten().collect();
    if let Some(unknown) = months.iter().find(|m| m.resolve().is_none()) {
        return Some(unknown_month_error(&unknown.month));
    }
    let resolved: Vec<YearMonth> = months.iter().filter_map(|m| m.resolve()).collect();
    if resolved.len() < 2 || resolved[0].as_number() >= resolved[1].as_number() {
        return Some(MONTHS_ORDER_ERROR.to_string());
    }
    None
}

/// Checks that every account slot is set and there is at least one
pub fn validate_accounts(accounts: &[Option<Pk>]) -> Option<String> {
    if accounts.iter().any(Option::is_none) {
        return Some(ACCOUNTS_NULL_ERROR.to_string());
    }
    if accounts.is_empty() {
        return Some(ACCOUNTS_EMPTY_ERROR.to_string());
    }
    None
}

fn validated_range(
    months: &[Option<MonthInput>; 2],
    accounts: &[Option<Pk>],
) -> Result<(Vec<Pk>, YearMonth, YearMonth), String> {
    if let Some(message) = validate_months(months).or_else(|| validate_accounts(accounts)) {
        return Err(message);
    }
    let resolve = |i: usize| {
        months[i]
            .as_ref()
            .and_then(MonthInput::resolve)
            .ok_or_else(|| MONTHS_NULL_ERROR.to_string())
    };
    Ok((accounts.iter().flatten().copied().collect(), resolve(0)?, resolve(1)?))
}

/// Query for a balance evolution report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceEvolutionQuery {
    pub accounts: Vec<Pk>,
    pub months: (YearMonth, YearMonth),
}

impl BalanceEvolutionQuery {
    pub fn months(&self) -> Vec<YearMonth> {
        months_between(&self.months.0, &self.months.1)
    }

    pub fn periods(&self) -> Vec<Period> {
        self.months().iter().filter_map(YearMonth::to_period).collect()
    }
}

/// Balance evolution form value
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEvolutionForm {
    pub picked_months: [Option<MonthInput>; 2],
    pub picked_accounts: Vec<Option<Pk>>,
}

impl Default for BalanceEvolutionForm {
    fn default() -> Self {
        Self {
            picked_months: [None, None],
            picked_accounts: vec![None, None],
        }
    }
}

impl BalanceEvolutionForm {
    pub fn submit(&self) -> Result<BalanceEvolutionQuery, String> {
        let (accounts, start, end) = validated_range(&self.picked_months, &self.picked_accounts)?;
        Ok(BalanceEvolutionQuery {
            accounts,
            months: (start, end),
        })
    }
}

/// Options converting flow values into a single currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_portfolio: Option<PricePortfolio>,
    /// Currency code all values are converted to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert_to: Option<String>,
}

/// Query for a flow evolution report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowEvolutionQuery {
    pub accounts: Vec<Pk>,
    pub months: (YearMonth, YearMonth),
    pub currency_opts: Option<CurrencyOpts>,
}

impl FlowEvolutionQuery {
    pub fn periods(&self) -> Vec<Period> {
        months_between(&self.months.0, &self.months.1)
            .iter()
            .filter_map(YearMonth::to_period)
            .collect()
    }
}

/// Whether a report request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Waiting,
    Loading,
}

/// Flow evolution form value and its last result
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEvolutionForm {
    pub picked_months: [Option<MonthInput>; 2],
    pub selected_accounts: Vec<Option<Pk>>,
    pub portfolio: Option<PricePortfolio>,
    pub target_currency: Option<String>,
    pub phase: Phase,
    pub accounts_flows: Option<Vec<AccountFlows>>,
    pub table_periods: Option<Vec<Period>>,
}

impl Default for FlowEvolutionForm {
    fn default() -> Self {
        Self {
            picked_months: [None, None],
            selected_accounts: vec![None, None],
            portfolio: None,
            target_currency: None,
            phase: Phase::Waiting,
            accounts_flows: None,
            table_periods: None,
        }
    }
}

impl FlowEvolutionForm {
    /// Builds the query and moves to [`Phase::Loading`].
    pub fn submit(&mut self) -> Result<FlowEvolutionQuery, String> {
        if self.phase == Phase::Loading {
            return Err(ALREADY_LOADING_ERROR.to_string());
        }
        let (accounts, start, end) =
            validated_range(&self.picked_months, &self.selected_accounts)?;
        let currency_opts = match (&self.portfolio, &self.target_currency) {
            (None, None) => None,
            (portfolio, target) => Some(CurrencyOpts {
                price_portfolio: portfolio.clone(),
                convert_to: target.clone(),
            }),
        };
        self.phase = Phase::Loading;
        Ok(FlowEvolutionQuery {
            accounts,
            months: (start, end),
            currency_opts,
        })
    }

    /// Stores the report data and goes back to [`Phase::Waiting`]
    pub fn receive(&mut self, accounts_flows: Vec<AccountFlows>, periods: Vec<Period>) {
        self.phase = Phase::Waiting;
        self.accounts_flows = Some(accounts_flows);
        self.table_periods = Some(periods);
    }

    /// The request failed, allow a new submission
    pub fn fail(&mut self) {
        self.phase = Phase::Waiting;
    }
}

// ==================== Exchange Rates ====================

/// Query for the exchange rate data endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateQuery {
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
    pub currency_codes: Vec<String>,
}

/// Exchange rate fetcher form value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRateFetcherForm {
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    /// Raw input, `EUR, BRL`
    pub currency_codes_input: Option<String>,
}

impl ExchangeRateFetcherForm {
    pub fn currency_codes(&self) -> Vec<String> {
        tags::currency_codes_from_user_input(self.currency_codes_input.as_deref())
    }

    pub fn to_query(&self) -> CoreResult<ExchangeRateQuery> {
        let mut errors = vec![];
        if self.start_at.is_none() {
            errors.push("Missing start date".to_string());
        }
        if self.end_at.is_none() {
            errors.push("Missing end date".to_string());
        }
        let currency_codes = self.currency_codes();
        if currency_codes.iter().all(|c| c.is_empty()) {
            errors.push("At least one currency code is needed.".to_string());
        }
        match (self.start_at, self.end_at) {
            (Some(start_at), Some(end_at)) if errors.is_empty() => {
                if start_at > end_at {
                    return Err(CoreError::validation(
                        "The end date appears to come before the start date.",
                    ));
                }
                Ok(ExchangeRateQuery {
                    start_at,
                    end_at,
                    currency_codes: currency_codes.into_iter().filter(|c| !c.is_empty()).collect(),
                })
            }
            _ => Err(CoreError::Validation { messages: errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Money, Movement};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn filled_spec() -> TransactionSpec {
        TransactionSpec {
            description: "Groceries".to_string(),
            reference: Some(String::new()),
            date: NaiveDate::from_ymd_opt(2019, 1, 2),
            movements: vec![
                MovementSpec {
                    account: Some(3),
                    currency: Some(1),
                    quantity: Some(d("10")),
                    comment: None,
                },
                MovementSpec {
                    account: Some(4),
                    currency: Some(1),
                    quantity: Some(d("-10")),
                    comment: Some("cash".to_string()),
                },
            ],
            tags_input: Some("foo:bar".to_string()),
        }
    }

    #[test]
    fn test_transaction_spec_default_has_two_movements() {
        let spec = TransactionSpec::default();
        assert_eq!(spec.movements.len(), 2);
        assert!(spec.movements.iter().all(|m| *m == MovementSpec::default()));
    }

    #[test]
    fn test_add_and_remove_movements() {
        let mut spec = TransactionSpec::default();
        spec.add_movement();
        assert_eq!(spec.movements.len(), 3);
        assert!(!spec.remove_movement(0));
        assert!(!spec.remove_movement(1));
        assert!(!spec.remove_movement(5));
        assert!(spec.remove_movement(2));
        assert_eq!(spec.movements.len(), 2);
    }

    #[test]
    fn test_copy_to_next() {
        let mut spec = filled_spec();
        spec.movements[1].currency = None;
        spec.movements[1].quantity = None;
        assert!(spec.copy_currency_to_next(0));
        assert!(spec.copy_quantity_to_next(0));
        assert_eq!(spec.movements[1].currency, Some(1));
        assert_eq!(spec.movements[1].quantity, Some(d("-10")));
        assert!(spec.is_last_movement(1));
        assert!(!spec.copy_currency_to_next(1));
    }

    #[test]
    fn test_to_request() {
        let request = filled_spec().to_request().unwrap();
        assert_eq!(request.reference, None);
        assert_eq!(request.movements.len(), 2);
        assert_eq!(request.movements[1].comment.as_deref(), Some("cash"));
        assert_eq!(request.tags, vec![Tag::new("foo", "bar")]);
    }

    #[test]
    fn test_to_request_collects_errors() {
        let mut spec = TransactionSpec::default();
        spec.tags_input = Some("nope".to_string());
        let err = spec.to_request().unwrap_err();
        let messages = err.messages();
        assert!(messages.contains(&"Missing description".to_string()));
        assert!(messages.contains(&"Missing date".to_string()));
        assert!(messages.contains(&"Movement[0]: missing account".to_string()));
        assert!(messages.contains(&"Movement[1]: missing quantity".to_string()));
        assert!(messages.contains(&tags::TAGS_FORMAT_ERROR.to_string()));
    }

    #[test]
    fn test_from_transaction_and_template() {
        let transaction = Transaction {
            pk: 9,
            description: "Rent".to_string(),
            reference: Some("ref".to_string()),
            date: NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            movements: vec![Movement {
                account: 3,
                money: Money::new(1, d("-500")),
                comment: None,
            }],
            tags: vec![Tag::new("a", "b"), Tag::new("c", "d")],
        };
        let spec = TransactionSpec::from_transaction(&transaction);
        assert_eq!(spec.date, Some(transaction.date));
        assert_eq!(spec.tags_input.as_deref(), Some("a:b c:d"));
        assert_eq!(spec.movements[0].quantity, Some(d("-500")));

        let template = TransactionSpec::template_from(&transaction);
        assert_eq!(template.date, None);
        assert_eq!(template.description, "Rent");
    }

    #[test]
    fn test_account_spec_validate() {
        let spec = AccountSpec {
            name: "Cash".to_string(),
            acc_type: Some(AccType::Leaf),
            parent: Some(1),
        };
        assert!(spec.validate().is_ok());

        let orphan = AccountSpec {
            parent: None,
            ..spec.clone()
        };
        assert_eq!(
            orphan.validate().unwrap_err().messages(),
            vec!["Non root accounts need a parent"]
        );

        let empty = AccountSpec::default();
        assert_eq!(empty.validate().unwrap_err().messages().len(), 2);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["accType"], "Leaf");
    }

    #[test]
    fn test_validate_months() {
        let nov = Some(MonthInput::new("November", 2018));
        let feb = Some(MonthInput::new("February", 2019));
        assert_eq!(validate_months(&[nov.clone(), None]), Some(MONTHS_NULL_ERROR.to_string()));
        assert_eq!(
            validate_months(&[nov.clone(), Some(MonthInput::new("Smarch", 2019))]),
            Some("Unkown month \"Smarch\"".to_string())
        );
        assert_eq!(
            validate_months(&[feb.clone(), nov.clone()]),
            Some(MONTHS_ORDER_ERROR.to_string())
        );
        assert_eq!(
            validate_months(&[nov.clone(), nov.clone()]),
            Some(MONTHS_ORDER_ERROR.to_string())
        );
        assert_eq!(validate_months(&[nov, feb]), None);
    }

    #[test]
    fn test_validate_accounts() {
        assert_eq!(validate_accounts(&[Some(1), None]), Some(ACCOUNTS_NULL_ERROR.to_string()));
        assert_eq!(validate_accounts(&[]), Some(ACCOUNTS_EMPTY_ERROR.to_string()));
        assert_eq!(validate_accounts(&[Some(1)]), None);
    }

    #[test]
    fn test_balance_evolution_form_submit() {
        let mut form = BalanceEvolutionForm::default();
        assert_eq!(form.submit().unwrap_err(), MONTHS_NULL_ERROR);

        form.picked_months = [
            Some(MonthInput::new("November", 2018)),
            Some(MonthInput::new("February", 2019)),
        ];
        assert_eq!(form.submit().unwrap_err(), ACCOUNTS_NULL_ERROR);

        form.picked_accounts = vec![Some(3), Some(4)];
        let query = form.submit().unwrap();
        assert_eq!(query.accounts, vec![3, 4]);
        assert_eq!(query.months().len(), 4);
        assert_eq!(query.periods().len(), 4);
    }

    #[test]
    fn test_flow_evolution_form_phases() {
        let mut form = FlowEvolutionForm {
            picked_months: [
                Some(MonthInput::new("January", 2019)),
                Some(MonthInput::new("March", 2019)),
            ],
            selected_accounts: vec![Some(3)],
            target_currency: Some("EUR".to_string()),
            ..Default::default()
        };

        let query = form.submit().unwrap();
        assert_eq!(form.phase, Phase::Loading);
        assert_eq!(query.periods().len(), 3);
        let opts = query.currency_opts.unwrap();
        assert_eq!(opts.convert_to.as_deref(), Some("EUR"));
        assert_eq!(opts.price_portfolio, None);

        assert_eq!(form.submit().unwrap_err(), ALREADY_LOADING_ERROR);

        form.receive(vec![], vec![]);
        assert_eq!(form.phase, Phase::Waiting);
        assert_eq!(form.accounts_flows, Some(vec![]));
        assert!(form.submit().is_ok());
        form.fail();
        assert_eq!(form.phase, Phase::Waiting);
    }

    #[test]
    fn test_flow_evolution_without_currency_opts() {
        let mut form = FlowEvolutionForm {
            picked_months: [
                Some(MonthInput::new("January", 2019)),
                Some(MonthInput::new("February", 2019)),
            ],
            selected_accounts: vec![Some(3)],
            ..Default::default()
        };
        assert_eq!(form.submit().unwrap().currency_opts, None);
    }

    #[test]
    fn test_exchange_rate_fetcher_form() {
        let form = ExchangeRateFetcherForm {
            start_at: NaiveDate::from_ymd_opt(2019, 1, 1),
            end_at: NaiveDate::from_ymd_opt(2019, 2, 1),
            currency_codes_input: Some("EUR, BRL".to_string()),
        };
        let query = form.to_query().unwrap();
        assert_eq!(query.currency_codes, vec!["EUR", "BRL"]);

        let reversed = ExchangeRateFetcherForm {
            start_at: form.end_at,
            end_at: form.start_at,
            ..form.clone()
        };
        assert!(reversed.to_query().is_err());

        let empty = ExchangeRateFetcherForm::default();
        assert_eq!(empty.to_query().unwrap_err().messages().len(), 3);
    }
}
