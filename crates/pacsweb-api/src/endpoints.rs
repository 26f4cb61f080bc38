//! Paths of the ledger REST API, relative to the base URL

use pacsweb_core::forms::ExchangeRateQuery;
use pacsweb_core::{Pagination, Pk};

pub const ACCOUNTS: &str = "/accounts/";
pub const TRANSACTIONS: &str = "/transactions/";
pub const CURRENCIES: &str = "/currencies/";
pub const BALANCE_EVOLUTION: &str = "/reports/balance-evolution/";
pub const FLOW_EVOLUTION: &str = "/reports/flow-evolution/";
pub const FEATURE_TOGGLES: &str = "/featuretoggles";
pub const AUTH_TOKEN: &str = "/auth/token";
pub const EXCHANGE_RATES: &str = "/exchange_rates/fetch/";
pub const EXCHANGE_RATES_V2: &str = "/exchange_rates/data/v2";

pub fn account(pk: Pk) -> String {
    format!("{}{}/", ACCOUNTS, pk)
}

pub fn transaction(pk: Pk) -> String {
    format!("{}{}/", TRANSACTIONS, pk)
}

/// Query string parameters, in the order they are sent
pub type QueryParams = Vec<(&'static str, String)>;

/// Journal of an account
pub fn journal(account: Pk) -> String {
    format!("{}{}/journal/", ACCOUNTS, account)
}

/// Journal page, newest first. The server counts pages from 1 while
/// [`Pagination::page`] counts from 0.
pub fn journal_query(pagination: &Pagination) -> QueryParams {
    vec![
        ("page", pagination.server_page().to_string()),
        ("page_size", pagination.page_size.to_string()),
        ("reverse", "1".to_string()),
    ]
}

/// Query of both exchange rate endpoints. The token is only sent when given.
pub fn exchange_rates_query(query: &ExchangeRateQuery, token: Option<&str>) -> QueryParams {
    let mut params = vec![
        ("start_at", query.start_at.format("%Y-%m-%d").to_string()),
        ("end_at", query.end_at.format("%Y-%m-%d").to_string()),
        ("currency_codes", query.currency_codes.join(",")),
    ];
    if let Some(token) = token {
        params.push(("token", token.to_string()));
    }
    params
}
