//! Monetary types for the Cambio service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A monetary amount with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 currency code.
    pub currency: Currency,
    /// The amount value (exact decimal).
    pub amount: Decimal,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(currency: Currency, amount: Decimal) -> Self {
        Self { currency, amount }
    }

    /// Check if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// A table of exchange rates relative to one base currency.
///
/// Produced atomically per provider fetch or snapshot load and replaced
/// wholesale on refresh. Always contains an entry for the base currency
/// equal to exactly 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    base: Currency,
    rates: HashMap<Currency, Decimal>,
}

impl RateTable {
    /// Create a new rate table for the given base currency.
    pub fn new(base: Currency, mut rates: HashMap<Currency, Decimal>) -> Self {
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    /// The base currency this table is expressed against.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// Look up the base-relative rate for a currency.
    pub fn rate(&self, currency: &Currency) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }

    /// Number of entries in the table (including the base).
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterate over the (currency, rate) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &Decimal)> {
        self.rates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_uppercases() {
        assert_eq!(Currency::new("usd"), Currency::usd());
        assert_eq!(Currency::new("Eur").code(), "EUR");
    }

    #[test]
    fn test_money_positivity() {
        assert!(Money::new(Currency::usd(), dec!(0.01)).is_positive());
        assert!(!Money::new(Currency::usd(), Decimal::ZERO).is_positive());
        assert!(!Money::new(Currency::usd(), dec!(-5)).is_positive());
    }

    #[test]
    fn test_rate_table_always_contains_base_at_one() {
        let table = RateTable::new(
            Currency::eur(),
            HashMap::from([(Currency::usd(), dec!(1.18))]),
        );
        assert_eq!(table.rate(&Currency::eur()), Some(Decimal::ONE));
        assert_eq!(table.rate(&Currency::usd()), Some(dec!(1.18)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rate_table_base_entry_is_normalized() {
        // A provider payload carrying EUR:1.0000001 must not override the
        // invariant that base-to-base is exactly 1.
        let table = RateTable::new(
            Currency::eur(),
            HashMap::from([(Currency::eur(), dec!(1.0000001)), (Currency::usd(), dec!(1.18))]),
        );
        assert_eq!(table.rate(&Currency::eur()), Some(Decimal::ONE));
    }

    #[test]
    fn test_rate_table_unknown_currency() {
        let table = RateTable::new(Currency::eur(), HashMap::new());
        assert_eq!(table.rate(&Currency::new("XYZ")), None);
    }
}
