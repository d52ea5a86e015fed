//! Exchange-rate lookup
//!
//! A pure, read-only cross-rate table. Rates are derived from a USD
//! value per currency, so the table is total over every supported
//! pair and `rate(c, c)` is exactly 1.

use crate::{Currency, Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

/// Cross-rate table over the supported currencies.
///
/// `rate(from, to)` is the multiplier converting an amount in `from`
/// into `to`: `amount_to = amount_from * rate(from, to)`.
#[derive(Debug, Clone)]
pub struct RateTable {
    /// Value of one unit of each currency, expressed in USD
    usd_values: HashMap<Currency, Decimal>,
    /// Explicit pair overrides, applied before the derived cross rate
    overrides: HashMap<(Currency, Currency), Decimal>,
}

impl RateTable {
    /// Build a table from a USD value per currency.
    ///
    /// Every supported currency must be present with a positive value.
    pub fn from_usd_values(usd_values: HashMap<Currency, Decimal>) -> Result<Self> {
        for currency in Currency::ALL {
            match usd_values.get(&currency) {
                Some(v) if *v > Decimal::ZERO => {}
                Some(_) => {
                    return Err(Error::Config(format!(
                        "USD value for {currency} must be positive"
                    )))
                }
                None => {
                    return Err(Error::Config(format!("missing USD value for {currency}")))
                }
            }
        }
        Ok(Self {
            usd_values,
            overrides: HashMap::new(),
        })
    }

    /// Pin an exact rate for one ordered pair, shadowing the derived
    /// cross rate. Used by configuration and scenario tests.
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.overrides.insert((from, to), rate);
        self
    }

    /// Conversion multiplier from `from` into `to`. Always positive;
    /// exactly 1 for `from == to` unless explicitly overridden.
    pub fn rate(&self, from: Currency, to: Currency) -> Decimal {
        if let Some(rate) = self.overrides.get(&(from, to)) {
            return *rate;
        }
        if from == to {
            return Decimal::ONE;
        }
        // Total by construction; from_usd_values validated every entry.
        self.usd_values[&from] / self.usd_values[&to]
    }
}

impl Default for RateTable {
    fn default() -> Self {
        let usd_values = HashMap::from([
            (Currency::USD, dec!(1.0)),
            (Currency::EUR, dec!(1.08)),
            (Currency::GBP, dec!(1.27)),
            (Currency::JPY, dec!(0.0067)),
            (Currency::CHF, dec!(1.13)),
            (Currency::BRL, dec!(0.20)),
        ]);
        Self {
            usd_values,
            overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rate() {
        let rates = RateTable::default();
        for c in Currency::ALL {
            assert_eq!(rates.rate(c, c), Decimal::ONE);
        }
    }

    #[test]
    fn test_rates_are_positive_and_reciprocal() {
        let rates = RateTable::default();
        for from in Currency::ALL {
            for to in Currency::ALL {
                let forward = rates.rate(from, to);
                assert!(forward > Decimal::ZERO);
                // Derived cross rates invert exactly.
                let round_trip = forward * rates.rate(to, from);
                let error = (round_trip - Decimal::ONE).abs();
                assert!(error < dec!(0.0000001), "{from}/{to} round trip {round_trip}");
            }
        }
    }

    #[test]
    fn test_override_shadows_derived_rate() {
        let rates = RateTable::default().with_rate(Currency::USD, Currency::JPY, dec!(150));
        assert_eq!(rates.rate(Currency::USD, Currency::JPY), dec!(150));
        // The reverse direction still uses the derived cross rate.
        assert_eq!(rates.rate(Currency::JPY, Currency::USD), dec!(0.0067));
    }

    #[test]
    fn test_from_usd_values_rejects_missing_currency() {
        let mut values = HashMap::new();
        values.insert(Currency::USD, dec!(1.0));
        assert!(matches!(
            RateTable::from_usd_values(values),
            Err(Error::Config(_))
        ));
    }
}
