//! Currency and monetary scale types.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All monetary amounts are `rust_decimal::Decimal` with at most
//! [`MONEY_SCALE`] fractional digits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits allowed on stored monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Returns true if the amount fits the ledger's monetary scale.
///
/// `1.25` and `1.250` both fit; `1.255` does not.
#[must_use]
pub fn fits_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Idr => write!(f, "IDR"),
            Self::Eur => write!(f, "EUR"),
            Self::Sgd => write!(f, "SGD"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "IDR" => Ok(Self::Idr),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_fits_money_scale() {
        assert!(fits_money_scale(dec!(100)));
        assert!(fits_money_scale(dec!(100.25)));
        assert!(fits_money_scale(dec!(100.250)));
        assert!(!fits_money_scale(dec!(100.255)));
        assert!(!fits_money_scale(dec!(0.001)));
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Idr.to_string(), "IDR");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Sgd.to_string(), "SGD");
        assert_eq!(Currency::Jpy.to_string(), "JPY");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("IDR").unwrap(), Currency::Idr);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }
}
