//! ISO 4217 currencies supported by the network

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of supported currencies; reserve sets hold one account each.
pub const CURRENCY_COUNT: usize = 6;

/// ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US Dollar
    USD,
    /// Euro
    EUR,
    /// British Pound
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Brazilian Real
    BRL,
}

impl Currency {
    /// All supported currencies, in reserve-index order
    pub const ALL: [Currency; CURRENCY_COUNT] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::BRL,
    ];

    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::BRL => "BRL",
        }
    }

    /// Stable index used to address a bank's reserve account for this
    /// currency. Reserves are looked up through this mapping, never by
    /// scanning an account list.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CHF" => Ok(Currency::CHF),
            "BRL" => Ok(Currency::BRL),
            other => Err(crate::Error::Config(format!("unknown currency: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_from_str() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("BRL".parse::<Currency>().unwrap(), Currency::BRL);
        assert!("XXX".parse::<Currency>().is_err());
    }

    #[test]
    fn test_index_is_stable_and_distinct() {
        for (i, c) in Currency::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
            assert_eq!(Currency::ALL[c.index()], *c);
        }
    }
}
