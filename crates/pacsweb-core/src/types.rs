//! Ledger entities as the server sends them.
//!
//! Field names follow the server's wire format (`acc_type`,
//! `movements_specs`, ...); the camelCase spellings are accepted as aliases
//! so values produced by the forms deserialize too.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use pacsweb_parser::Tag;

/// Primary key of a server side entity
pub type Pk = u64;

/// Account type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccType {
    /// The single root of the account forest
    Root,
    /// Groups other accounts, receives no movements itself
    Branch,
    /// Receives movements
    Leaf,
}

impl AccType {
    /// One letter abbreviation used in account labels
    pub fn abbrev(&self) -> char {
        match self {
            AccType::Root => 'R',
            AccType::Branch => 'B',
            AccType::Leaf => 'L',
        }
    }
}

impl std::str::FromStr for AccType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "root" | "r" => Ok(AccType::Root),
            "branch" | "b" => Ok(AccType::Branch),
            "leaf" | "l" => Ok(AccType::Leaf),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl std::fmt::Display for AccType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccType::Root => write!(f, "Root"),
            AccType::Branch => write!(f, "Branch"),
            AccType::Leaf => write!(f, "Leaf"),
        }
    }
}

/// A node of the account tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub pk: Pk,
    pub name: String,
    #[serde(rename = "acc_type", alias = "accType")]
    pub acc_type: AccType,
    /// Parent account, `None` only for the root
    #[serde(default)]
    pub parent: Option<Pk>,
}

impl Account {
    pub fn is_root(&self) -> bool {
        self.acc_type == AccType::Root
    }

    pub fn is_leaf(&self) -> bool {
        self.acc_type == AccType::Leaf
    }
}

/// Currency information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub pk: Pk,
    pub name: String,
    /// Server spelling, kept on the wire
    #[serde(default)]
    pub imutable: bool,
}

/// An amount of one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency: Pk,
    pub quantity: Decimal,
}

impl Money {
    pub fn new(currency: Pk, quantity: Decimal) -> Self {
        Self { currency, quantity }
    }
}

/// One Money per currency
pub type Balance = Vec<Money>;

/// A signed money entry of a transaction, tied to one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub account: Pk,
    pub money: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A balanced (per currency, checked by the server) set of movements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub pk: Pk,
    pub description: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub date: NaiveDate,
    #[serde(rename = "movements_specs", alias = "movements")]
    pub movements: Vec<Movement>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Transaction {
    /// Accounts touched by this transaction, in movement order
    pub fn accounts(&self) -> Vec<Pk> {
        self.movements.iter().map(|m| m.account).collect()
    }

    /// Check if transaction involves a specific account
    pub fn involves_account(&self, account: Pk) -> bool {
        self.movements.iter().any(|m| m.account == account)
    }
}
