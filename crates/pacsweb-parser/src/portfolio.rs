//! Price portfolio parsing and validation
//!
//! A price portfolio is a JSON file the user picks when asking for reports
//! converted into a single currency:
//!
//! ```json
//! [{"currency": "EUR", "prices": [{"date": "2019-01-01", "price": 1.14}]}]
//! ```

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ParseError;
use crate::types::{PortfolioItem, PortfolioPrice, PortfolioStats, PricePortfolio};
use crate::validation::{self, all, fail_with, JsonKind, Validation};

/// Digits kept by [`normalize_prices`]
pub const PRICE_DIGITS: u32 = 5;

/// Parses raw file contents into a validated price portfolio.
pub fn parse_contents(contents: &str) -> Validation<PricePortfolio> {
    let value: Value =
        serde_json::from_str(contents).map_err(|_| vec!["Invalid json!".to_string()])?;
    validate_portfolio(&value)?;
    to_portfolio(&value)
}

/// Validates the shape of a portfolio, reporting every problem found.
pub fn validate_portfolio(value: &Value) -> Validation<()> {
    let items = value
        .as_array()
        .ok_or_else(|| vec!["Portifolio should be an array".to_string()])?;
    all(items.iter().map(validate_item))
}

/// Validates one `{currency, prices}` entry.
pub fn validate_item(item: &Value) -> Validation<()> {
    let currency = validation::has_prop("currency", item).and_then(validate_currency);
    let prices = validation::has_prop("prices", item).and_then(validate_prices);
    all(vec![currency, prices])
}

/// A currency code must be a three character string.
pub fn validate_currency(value: &Value) -> Validation<()> {
    let code = fail_with(validation::is(JsonKind::String, value), "Currency must be a string")?;
    let code = code.as_str().unwrap_or_default();
    fail_with(
        validation::has_length(3, code),
        "Currency must be a string of 3 characters",
    )?;
    Ok(())
}

fn validate_prices(value: &Value) -> Validation<()> {
    let prices = fail_with(validation::is(JsonKind::Array, value), "Prices should be an array")?;
    let prices = prices.as_array().map(Vec::as_slice).unwrap_or_default();
    all(prices.iter().map(validate_price))
}

/// Validates one `{date, price}` entry.
pub fn validate_price(value: &Value) -> Validation<()> {
    let price = validation::has_prop("price", value)
        .and_then(|p| fail_with(validation::is(JsonKind::Number, p), "Price should be a number."))
        .map(|_| ());
    let date = validation::has_prop("date", value).and_then(|d| {
        let text = d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string());
        validation::is_date(&text).map(|_| ())
    });
    all(vec![price, date])
}

// Assumes `value` passed `validate_portfolio`.
fn to_portfolio(value: &Value) -> Validation<PricePortfolio> {
    let mut portfolio = Vec::new();
    let mut errors = Vec::new();
    for item in value.as_array().map(Vec::as_slice).unwrap_or_default() {
        let mut prices = Vec::new();
        for p in item["prices"].as_array().map(Vec::as_slice).unwrap_or_default() {
            match p["price"].as_f64().and_then(Decimal::from_f64) {
                Some(price) => prices.push(PortfolioPrice {
                    date: p["date"].as_str().unwrap_or_default().to_string(),
                    price,
                }),
                None => errors.push(format!("Price {} cannot be represented.", p["price"])),
            }
        }
        portfolio.push(PortfolioItem {
            currency: item["currency"].as_str().unwrap_or_default().to_string(),
            prices,
        });
    }
    if errors.is_empty() {
        Ok(portfolio)
    } else {
        Err(errors)
    }
}

/// Number of price entries per currency.
pub fn stats(portfolio: &PricePortfolio) -> PortfolioStats {
    PortfolioStats {
        number_of_entries: portfolio
            .iter()
            .map(|item| (item.currency.clone(), item.prices.len()))
            .collect(),
    }
}

/// Rounds every price to a fixed number of digits.
pub fn normalize_prices(portfolio: &PricePortfolio) -> PricePortfolio {
    portfolio
        .iter()
        .map(|item| PortfolioItem {
            currency: item.currency.clone(),
            prices: item
                .prices
                .iter()
                .map(|p| {
                    let mut price = p
                        .price
                        .round_dp_with_strategy(PRICE_DIGITS, RoundingStrategy::MidpointAwayFromZero);
                    price.rescale(PRICE_DIGITS);
                    PortfolioPrice {
                        date: p.date.clone(),
                        price,
                    }
                })
                .collect(),
        })
        .collect()
}

// ==================== exchangeratesapi.io conversion ====================

/// Payload of an exchangeratesapi.io `history` request
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRatesHistory {
    #[serde(default)]
    pub base: Option<String>,
    /// date -> currency -> rate (units of currency per unit of base)
    pub rates: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub start_at: Option<String>,
    #[serde(default)]
    pub end_at: Option<String>,
}

/// Converts an exchange rates history into a price portfolio.
///
/// Days without a rate (weekends, holidays) repeat the previous day's rate,
/// and rates are inverted so that each price is the value of one unit of the
/// currency in the base currency. A currency missing from the first days
/// starts at the first day it has a rate.
pub fn from_exchange_rates_api(history: &ExchangeRatesHistory) -> Result<PricePortfolio, ParseError> {
    let mut by_date: BTreeMap<NaiveDate, &BTreeMap<String, f64>> = BTreeMap::new();
    for (date, rates) in &history.rates {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            ParseError::InvalidRates {
                message: format!("invalid date {}", date),
            }
        })?;
        by_date.insert(parsed, rates);
    }

    let (first_day, last_day) = match (by_date.keys().next(), by_date.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ParseError::InvalidRates {
                message: "no rates found".to_string(),
            })
        }
    };
    let currencies: BTreeSet<&String> = by_date.values().flat_map(|rates| rates.keys()).collect();

    let mut portfolio = Vec::with_capacity(currencies.len());
    for currency in currencies {
        let mut prices = Vec::new();
        let mut last_rate: Option<f64> = None;
        let mut day = first_day;
        while day <= last_day {
            if let Some(rate) = by_date.get(&day).and_then(|r| r.get(currency)) {
                if last_rate.is_none() && day != first_day {
                    log::warn!("No rate for {} before {}, its prices start there", currency, day);
                }
                last_rate = Some(*rate);
            }
            if let Some(rate) = last_rate {
                let price = Decimal::from_f64(rate)
                    .and_then(|r| Decimal::ONE.checked_div(r))
                    .ok_or_else(|| ParseError::InvalidRates {
                        message: format!("invalid rate {} for {} at {}", rate, currency, day),
                    })?;
                prices.push(PortfolioPrice {
                    date: day.format("%Y-%m-%d").to_string(),
                    price,
                });
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        portfolio.push(PortfolioItem {
            currency: currency.clone(),
            prices,
        });
    }

    log::debug!(
        "Converted exchange rates from {} to {} into {} currencies",
        first_day,
        last_day,
        portfolio.len()
    );
    Ok(portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_invalid_json() {
        assert_eq!(parse_contents("{not json"), Err(vec!["Invalid json!".to_string()]));
    }

    #[test]
    fn test_parse_not_an_array() {
        assert_eq!(
            parse_contents(r#"{"currency": "EUR"}"#),
            Err(vec!["Portifolio should be an array".to_string()])
        );
    }

    #[test]
    fn test_parse_valid_portfolio() {
        let contents = r#"[
            {"currency": "EUR", "prices": [{"date": "2019-01-01", "price": 1.5}]},
            {"currency": "BRL", "prices": []}
        ]"#;
        let portfolio = parse_contents(contents).unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio[0].currency, "EUR");
        assert_eq!(portfolio[0].prices[0].date, "2019-01-01");
        assert_eq!(portfolio[0].prices[0].price, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn test_parse_accumulates_errors() {
        let contents = r#"[
            {"currency": "EURO", "prices": [{"date": "01-01-2019", "price": "1"}]},
            {"prices": 3}
        ]"#;
        let errors = parse_contents(contents).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Currency must be a string of 3 characters".to_string(),
                "Price should be a number.".to_string(),
                "Invalid date format: \"01-01-2019\".".to_string(),
                "Property \"currency\" returned null or undefined.".to_string(),
                "Prices should be an array".to_string(),
            ]
        );
    }

    #[test]
    fn test_numeric_date_is_quoted_in_message() {
        let errors =
            parse_contents(r#"[{"currency":"EUR","prices":[{"date":20190101,"price":1}]}]"#)
                .unwrap_err();
        assert_eq!(errors, vec!["Invalid date format: \"20190101\".".to_string()]);
    }

    #[test]
    fn test_unrepresentable_price_is_rejected() {
        let errors = parse_contents(
            r#"[{"currency":"EUR","prices":[{"date":"2019-01-01","price":1e300}]}]"#,
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Price 1"));
        assert!(errors[0].ends_with("cannot be represented."));
    }

    #[test]
    fn test_currency_must_be_string() {
        let errors = validate_item(&serde_json::json!({"currency": 12, "prices": []})).unwrap_err();
        assert_eq!(errors, vec!["Currency must be a string".to_string()]);
    }

    #[test]
    fn test_stats() {
        let portfolio = parse_contents(
            r#"[{"currency": "EUR", "prices": [{"date": "2019-01-01", "price": 1}, {"date": "2019-01-02", "price": 2}]}]"#,
        )
        .unwrap();
        let stats = stats(&portfolio);
        assert_eq!(stats.number_of_entries.get("EUR"), Some(&2));
    }

    #[test]
    fn test_normalize_prices() {
        let portfolio = vec![PortfolioItem {
            currency: "EUR".to_string(),
            prices: vec![
                PortfolioPrice {
                    date: "2019-01-01".to_string(),
                    price: Decimal::from_str("1.234567").unwrap(),
                },
                PortfolioPrice {
                    date: "2019-01-02".to_string(),
                    price: Decimal::from_str("1.5").unwrap(),
                },
            ],
        }];
        let normalized = normalize_prices(&portfolio);
        assert_eq!(normalized[0].prices[0].price.to_string(), "1.23457");
        assert_eq!(normalized[0].prices[1].price.to_string(), "1.50000");
    }

    #[test]
    fn test_from_exchange_rates_api_fills_gaps_and_inverts() {
        let history: ExchangeRatesHistory = serde_json::from_str(
            r#"{
                "base": "USD",
                "rates": {
                    "2019-01-04": {"EUR": 0.5, "BRL": 4.0},
                    "2019-01-01": {"EUR": 0.8, "BRL": 2.0}
                },
                "start_at": "2019-01-01",
                "end_at": "2019-01-04"
            }"#,
        )
        .unwrap();
        let portfolio = from_exchange_rates_api(&history).unwrap();
        assert_eq!(portfolio.len(), 2);

        let eur = portfolio.iter().find(|i| i.currency == "EUR").unwrap();
        let dates: Vec<&str> = eur.prices.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2019-01-01", "2019-01-02", "2019-01-03", "2019-01-04"]);
        assert_eq!(eur.prices[0].price, Decimal::from_str("1.25").unwrap());
        assert_eq!(eur.prices[2].price, Decimal::from_str("1.25").unwrap());
        assert_eq!(eur.prices[3].price, Decimal::from(2));
    }

    #[test]
    fn test_from_exchange_rates_api_late_currency() {
        let history: ExchangeRatesHistory = serde_json::from_str(
            r#"{"rates": {"2019-01-01": {"EUR": 0.5}, "2019-01-02": {"EUR": 0.5, "BRL": 4.0}}}"#,
        )
        .unwrap();
        let portfolio = from_exchange_rates_api(&history).unwrap();
        let currencies: Vec<&str> = portfolio.iter().map(|i| i.currency.as_str()).collect();
        assert_eq!(currencies, vec!["BRL", "EUR"]);

        let brl = &portfolio[0];
        assert_eq!(brl.prices.len(), 1);
        assert_eq!(brl.prices[0].date, "2019-01-02");
        assert_eq!(brl.prices[0].price, Decimal::from_str("0.25").unwrap());
        assert_eq!(portfolio[1].prices.len(), 2);
    }

    #[test]
    fn test_from_exchange_rates_api_empty() {
        let history = ExchangeRatesHistory {
            base: None,
            rates: BTreeMap::new(),
            start_at: None,
            end_at: None,
        };
        assert!(matches!(
            from_exchange_rates_api(&history),
            Err(ParseError::InvalidRates { .. })
        ));
    }
}
