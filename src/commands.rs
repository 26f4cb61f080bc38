//! Subcommand handlers: wire config, storage and the API client together
//! and render the result as text.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use pacsweb_api::{fetch_app_context, ClientOptions, HttpClient, LedgerApi, LoginService};
use pacsweb_config::Config;
use pacsweb_core::forms::{
    AccountSpec, BalanceEvolutionForm, ExchangeRateFetcherForm, FlowEvolutionForm, MonthInput,
    MovementSpec, TransactionSpec,
};
use pacsweb_core::{AccType, FeatureFlags, LedgerSnapshot, MoneyFormatter, Pagination, Pk, Secrets};
use pacsweb_parser::portfolio::{normalize_prices, stats};
use pacsweb_parser::{DefaultPortfolioParser, PortfolioParserTrait};
use pacsweb_utils::{FileStorage, TokenCache};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::views;

/// Parses `Month/Year`, e.g. `January/2019`. The month name is checked
/// later by the form.
pub fn parse_month_input(value: &str) -> Result<MonthInput> {
    let (month, year) = value
        .split_once('/')
        .ok_or_else(|| anyhow!("Expected Month/Year, got {:?}", value))?;
    let year = year
        .trim()
        .parse::<i32>()
        .with_context(|| format!("Invalid year in {:?}", value))?;
    Ok(MonthInput::new(month.trim(), year))
}

/// Parses `account:currency:quantity[:comment]`. Parts that cannot be read
/// are left empty for the form to report.
pub fn parse_movement(value: &str) -> MovementSpec {
    let mut parts = value.splitn(4, ':');
    let mut next = || parts.next().map(str::trim).filter(|p| !p.is_empty());
    MovementSpec {
        account: next().and_then(|p| p.parse().ok()),
        currency: next().and_then(|p| p.parse().ok()),
        quantity: next().and_then(|p| p.parse().ok()),
        comment: next().map(str::to_string),
    }
}

/// Fields of a new transaction as given on the command line
#[derive(Debug, Default)]
pub struct TransactionArgs {
    pub template: Option<Pk>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub date: Option<NaiveDate>,
    pub movements: Vec<String>,
    pub tags: Option<String>,
}

pub struct App {
    config: Config,
    storage: Arc<FileStorage>,
    password: Option<String>,
}

impl App {
    pub fn new(config: Config, password: Option<String>) -> Self {
        let storage = Arc::new(FileStorage::new(config.auth.token_store.clone()));
        Self {
            config,
            storage,
            password,
        }
    }

    fn formatter(&self) -> MoneyFormatter {
        MoneyFormatter::new(self.config.currency.decimal_places)
    }

    fn flags(&self) -> FeatureFlags {
        FeatureFlags::from_config(&self.config.features, self.storage.clone())
    }

    /// Host and token from the config, the token falling back to the
    /// encrypted cache when a password was given.
    pub fn secrets(&self) -> Result<Secrets> {
        let secrets = Secrets::from_config(&self.config);
        if secrets.token.is_some() {
            return Ok(secrets);
        }
        match &self.password {
            Some(password) => match TokenCache::new(self.storage.as_ref()).load(password)? {
                Some(token) => Ok(secrets.with_token(&token)),
                None => {
                    warn!("No cached token in {}", self.storage.path().display());
                    Ok(secrets)
                }
            },
            None => Ok(secrets),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.timeout_secs)
    }

    fn client(&self) -> Result<HttpClient> {
        let options = ClientOptions::from_secrets(&self.secrets()?)?
            .with_feature_toggles(self.config.features.toggles.clone())
            .with_timeout(self.timeout());
        Ok(HttpClient::new(options)?)
    }

    /// Client without a token, for the auth endpoint
    fn anonymous_client(&self) -> Result<HttpClient> {
        let options = ClientOptions::new(self.config.server.host.clone()).with_timeout(self.timeout());
        Ok(HttpClient::new(options)?)
    }

    // ==================== Accounts ====================

    pub async fn accounts(&self) -> Result<String> {
        let accounts = self.client()?.get_accounts().await?;
        let snapshot = LedgerSnapshot::new(accounts, vec![], vec![]);
        Ok(views::account_tree(&snapshot.tree()?))
    }

    pub async fn balance(&self, account: Pk) -> Result<String> {
        let snapshot = fetch_app_context(&self.client()?).await?;
        let account = snapshot.account(account)?;
        let balance = snapshot.balance_for_account(account);
        Ok(format!(
            "{}: {}",
            account.name,
            snapshot.moneys_repr(&self.formatter(), &balance)
        ))
    }

    pub async fn create_account(&self, name: String, acc_type: AccType, parent: Option<Pk>) -> Result<String> {
        let spec = AccountSpec {
            name,
            acc_type: Some(acc_type),
            parent,
        };
        let account = self.client()?.create_account(&spec).await?;
        Ok(format!("Created {}", pacsweb_core::accounts::make_acc_repr(&account)))
    }

    pub async fn delete_account(&self, pk: Pk) -> Result<String> {
        self.client()?.delete_account(pk).await?;
        Ok(format!("Deleted account {}", pk))
    }

    pub async fn currencies(&self) -> Result<String> {
        let currencies = self.client()?.get_currencies().await?;
        Ok(views::currencies(&currencies))
    }

    // ==================== Transactions ====================

    pub async fn transactions(&self) -> Result<String> {
        let snapshot = fetch_app_context(&self.client()?).await?;
        Ok(views::transactions(&snapshot, &snapshot.transactions))
    }

    pub async fn transaction(&self, pk: Pk) -> Result<String> {
        let client = self.client()?;
        let (snapshot, transaction) = tokio::try_join!(fetch_app_context(&client), client.get_transaction(pk))?;
        Ok(views::transaction_detail(&snapshot, &self.formatter(), &transaction))
    }

    pub async fn create_transaction(&self, args: TransactionArgs) -> Result<String> {
        let client = self.client()?;
        let mut spec = match args.template {
            Some(pk) => TransactionSpec::template_from(&client.get_transaction(pk).await?),
            None => TransactionSpec::default(),
        };
        if let Some(description) = args.description {
            spec.description = description;
        }
        if args.reference.is_some() {
            spec.reference = args.reference;
        }
        if args.date.is_some() {
            spec.date = args.date;
        }
        if !args.movements.is_empty() {
            spec.movements = args.movements.iter().map(|m| parse_movement(m)).collect();
        }
        if args.tags.is_some() {
            spec.tags_input = args.tags;
        }

        let request = spec.to_request()?;
        let transaction = client.create_transaction(&request).await?;
        info!("Created transaction {}", transaction.pk);
        let snapshot = fetch_app_context(&client).await?;
        Ok(views::transaction_detail(&snapshot, &self.formatter(), &transaction))
    }

    pub async fn delete_transaction(&self, pk: Pk) -> Result<String> {
        self.client()?.delete_transaction(pk).await?;
        Ok(format!("Deleted transaction {}", pk))
    }

    // ==================== Reports ====================

    pub async fn journal(&self, account: Pk, page: u32, page_size: Option<u32>) -> Result<String> {
        let pagination = Pagination::new(page, page_size.unwrap_or(self.config.pagination.page_size));
        let client = self.client()?;
        let (snapshot, journal) = tokio::try_join!(
            fetch_app_context(&client),
            client.get_paginated_journal(account, &pagination)
        )?;
        let account = snapshot.account(account)?;
        let rows = snapshot.journal_rows(account, &self.formatter(), &journal.results);
        Ok(views::journal(&journal, &pagination, &rows))
    }

    pub async fn balance_evolution(&self, accounts: Vec<Pk>, from: &str, to: &str) -> Result<String> {
        let form = BalanceEvolutionForm {
            picked_months: [Some(parse_month_input(from)?), Some(parse_month_input(to)?)],
            picked_accounts: accounts.into_iter().map(Some).collect(),
        };
        let query = form.submit().map_err(|e| anyhow!(e))?;
        let client = self.client()?;
        let (snapshot, data) = tokio::try_join!(
            fetch_app_context(&client),
            client.get_balance_evolution(&query)
        )?;
        let table = snapshot.balance_evolution_table(&query.months(), &data, &self.formatter());
        Ok(views::report(&table))
    }

    pub async fn flow_evolution(
        &self,
        accounts: Vec<Pk>,
        from: &str,
        to: &str,
        portfolio: Option<PathBuf>,
        convert_to: Option<String>,
    ) -> Result<String> {
        let portfolio = match portfolio {
            Some(path) => Some(DefaultPortfolioParser.parse_file(path).await?),
            None => None,
        };
        let mut form = FlowEvolutionForm {
            picked_months: [Some(parse_month_input(from)?), Some(parse_month_input(to)?)],
            selected_accounts: accounts.into_iter().map(Some).collect(),
            portfolio,
            target_currency: convert_to,
            ..Default::default()
        };
        let query = form.submit().map_err(|e| anyhow!(e))?;
        let client = self.client()?;
        let result = tokio::try_join!(fetch_app_context(&client), client.get_flows_evolution(&query));
        let (snapshot, flows) = match result {
            Ok(ok) => ok,
            Err(e) => {
                form.fail();
                return Err(e.into());
            }
        };
        form.receive(flows, query.periods());
        let table = snapshot.flow_evolution_table(
            form.table_periods.as_deref().unwrap_or_default(),
            form.accounts_flows.as_deref().unwrap_or_default(),
            &self.formatter(),
        );
        Ok(views::report(&table))
    }

    pub async fn exchange_rates(&self, start_at: NaiveDate, end_at: NaiveDate, currencies: String) -> Result<String> {
        let form = ExchangeRateFetcherForm {
            start_at: Some(start_at),
            end_at: Some(end_at),
            currency_codes_input: Some(currencies),
        };
        let query = form.to_query()?;
        let secrets = self.secrets()?;
        let portfolio = self
            .client()?
            .fetch_exchange_rates_with_flags(&self.flags(), &query, secrets.token.as_deref())
            .await?;
        Ok(serde_json::to_string_pretty(&normalize_prices(&portfolio))?)
    }

    pub async fn toggles(&self) -> Result<String> {
        let toggles = self.client()?.get_feature_toggles().await?;
        Ok(views::flags(&toggles))
    }

    pub async fn portfolio(&self, path: PathBuf) -> Result<String> {
        let portfolio = DefaultPortfolioParser.parse_file(path).await?;
        Ok(views::portfolio_stats(&stats(&portfolio)))
    }

    // ==================== Auth ====================

    /// Gets a token with an admin token, or recovers the session one, and
    /// caches it encrypted when a password was given.
    pub async fn login(&self, admin_token: Option<String>) -> Result<String> {
        let client = self.anonymous_client()?;
        let service = LoginService::new(&client);
        let token = match admin_token {
            Some(admin_token) => service.get_token(&admin_token).await?,
            None => match service.recover_token_from_cookies().await {
                Some(token) => token,
                None => bail!("No token could be recovered, pass --admin-token"),
            },
        };
        match &self.password {
            Some(password) => {
                TokenCache::new(self.storage.as_ref()).save(password, &token)?;
                Ok(format!("Token saved to {}", self.storage.path().display()))
            }
            None => Ok(token),
        }
    }

    pub fn show_token(&self) -> Result<String> {
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| anyhow!("A --password is needed to read the cached token"))?;
        match TokenCache::new(self.storage.as_ref()).load(password)? {
            Some(token) => Ok(token),
            None => Ok("No cached token".to_string()),
        }
    }

    pub fn clear_token(&self) -> Result<String> {
        TokenCache::new(self.storage.as_ref()).clear()?;
        Ok("Cached token removed".to_string())
    }

    // ==================== Flags ====================

    pub fn list_flags(&self) -> Result<String> {
        Ok(views::flags(&self.flags().all()?))
    }

    pub fn set_flag(&self, name: &str, active: bool) -> Result<String> {
        let flags = self.flags();
        if active {
            flags.set_active(name)?;
        } else {
            flags.set_inactive(name)?;
        }
        Ok(views::flags(&flags.all()?))
    }

    pub fn reset_flags(&self) -> Result<String> {
        let flags = self.flags();
        flags.reset()?;
        Ok(views::flags(&flags.all()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacsweb_core::features::TOKEN_IN_EXCHANGE_FETCHER;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn app(dir: &std::path::Path, yaml: &str, password: Option<&str>) -> App {
        let mut config = Config::from_yaml(yaml).unwrap();
        config.auth.token_store = dir.join("storage.json");
        App::new(config, password.map(str::to_string))
    }

    #[test]
    fn test_parse_month_input() {
        assert_eq!(parse_month_input("January/2019").unwrap(), MonthInput::new("January", 2019));
        assert_eq!(parse_month_input(" Foo / 2019 ").unwrap(), MonthInput::new("Foo", 2019));
        assert!(parse_month_input("January 2019").is_err());
        assert!(parse_month_input("January/x").is_err());
    }

    #[test]
    fn test_parse_movement() {
        let movement = parse_movement("3:1:-12.5:lunch: with friends");
        assert_eq!(movement.account, Some(3));
        assert_eq!(movement.currency, Some(1));
        assert_eq!(movement.quantity, Some("-12.5".parse::<Decimal>().unwrap()));
        assert_eq!(movement.comment.as_deref(), Some("lunch: with friends"));

        let movement = parse_movement("x::10");
        assert_eq!(movement.account, None);
        assert_eq!(movement.currency, None);
        assert_eq!(movement.quantity, Some(Decimal::from(10)));
        assert_eq!(movement.comment, None);
    }

    #[test]
    fn test_secrets_prefers_config_token() {
        let dir = tempdir().unwrap();
        let app = app(dir.path(), "auth:\n  token: abc\n", Some("pw"));
        assert_eq!(app.secrets().unwrap().token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_secrets_from_token_cache() {
        let dir = tempdir().unwrap();
        let app = app(dir.path(), "server:\n  host: http://h\n", Some("pw"));
        assert!(app.secrets().unwrap().token.is_none());

        TokenCache::new(app.storage.as_ref()).save("pw", "cached").unwrap();
        assert_eq!(app.secrets().unwrap().token.as_deref(), Some("cached"));
        assert_eq!(app.show_token().unwrap(), "cached");

        app.clear_token().unwrap();
        assert_eq!(app.show_token().unwrap(), "No cached token");
    }

    #[test]
    fn test_wrong_password_fails() {
        let dir = tempdir().unwrap();
        let app_ok = app(dir.path(), "{}", Some("pw"));
        TokenCache::new(app_ok.storage.as_ref()).save("pw", "cached").unwrap();
        let app_bad = app(dir.path(), "{}", Some("nope"));
        assert!(app_bad.secrets().is_err());
    }

    #[test]
    fn test_flags_persist() {
        let dir = tempdir().unwrap();
        let app = app(dir.path(), "{}", None);
        app.set_flag(TOKEN_IN_EXCHANGE_FETCHER, true).unwrap();
        assert!(app.flags().is_active(TOKEN_IN_EXCHANGE_FETCHER).unwrap());
        app.reset_flags().unwrap();
        assert!(!app.flags().is_active(TOKEN_IN_EXCHANGE_FETCHER).unwrap());
    }

    #[tokio::test]
    async fn test_balance_evolution_validates_before_requesting() {
        let dir = tempdir().unwrap();
        let app = app(dir.path(), "{}", None);
        let err = app
            .balance_evolution(vec![1], "March/2019", "January/2019")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            pacsweb_core::forms::MONTHS_ORDER_ERROR
        );
        let err = app
            .balance_evolution(vec![1], "Foo/2019", "January/2019")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unkown month \"Foo\"");
    }
}
