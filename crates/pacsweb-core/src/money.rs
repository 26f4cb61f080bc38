//! Money formatting and aggregation

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Currency, Money, Pk};

/// Decimal places shown when no formatter is configured
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Formats moneys as signed quantities followed by the currency name
#[derive(Debug, Clone, Copy)]
pub struct MoneyFormatter {
    decimal_places: u32,
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self {
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

impl MoneyFormatter {
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// `+12.12`, `-0.50`, `+0.00`
    pub fn quantity(&self, quantity: Decimal) -> String {
        let mut rounded =
            quantity.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            '-'
        } else {
            '+'
        };
        rounded.set_sign_positive(true);
        rounded.rescale(self.decimal_places);
        format!("{}{}", sign, rounded)
    }

    pub fn money<'a, G>(&self, get_currency: G, money: &Money) -> String
    where
        G: Fn(Pk) -> Option<&'a Currency>,
    {
        let currency = get_currency(money.currency)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("?{}", money.currency));
        format!("{} {}", self.quantity(money.quantity), currency)
    }

    pub fn moneys<'a, G>(&self, get_currency: G, moneys: &[Money]) -> String
    where
        G: Fn(Pk) -> Option<&'a Currency>,
    {
        moneys
            .iter()
            .map(|money| self.money(&get_currency, money))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Human representation of a single money, e.g. `+12.12 EUR`.
pub fn money_to_repr<'a, G>(get_currency: G, money: &Money) -> String
where
    G: Fn(Pk) -> Option<&'a Currency>,
{
    MoneyFormatter::default().money(get_currency, money)
}

/// Human representation of a list of moneys, e.g. `+12.12 EUR; -12.11 USD`.
///
/// One entry per money, in input order. Unknown currencies render as `?<pk>`.
pub fn moneys_to_repr<'a, G>(get_currency: G, moneys: &[Money]) -> String
where
    G: Fn(Pk) -> Option<&'a Currency>,
{
    MoneyFormatter::default().moneys(get_currency, moneys)
}

/// Sums quantities per currency, keeping the order in which currencies
/// first appear.
pub fn sum_moneys(moneys: &[Money]) -> Vec<Money> {
    let mut out: Vec<Money> = vec![];
    for money in moneys {
        match out.iter_mut().find(|m| m.currency == money.currency) {
            Some(total) => total.quantity += money.quantity,
            None => out.push(money.clone()),
        }
    }
    out
}
