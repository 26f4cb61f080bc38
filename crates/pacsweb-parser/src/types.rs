//! Common types produced by the parsers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A `name:value` tag attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

/// One price of a currency at a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPrice {
    /// Date in `YYYY-MM-DD`
    pub date: String,
    pub price: Decimal,
}

/// All known prices of one currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    /// Three letter currency code
    pub currency: String,
    pub prices: Vec<PortfolioPrice>,
}

/// A user supplied list of currency prices over time, used to convert
/// report values into a single currency.
pub type PricePortfolio = Vec<PortfolioItem>;

/// Summary of a price portfolio
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Number of price entries per currency code
    pub number_of_entries: std::collections::BTreeMap<String, usize>,
}
