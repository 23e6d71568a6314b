use crate::error::RefundError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary value.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules and keep all refund arithmetic out of floating point.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, RefundError> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RefundError::ValidationError(
                "Monetary amount must be non-negative".to_string(),
            ))
        }
    }

    /// Applies a refund percentage as a rational multiply (`value * percent / 100`),
    /// rounded half-up to 2 decimal places.
    pub fn apply_percent(&self, percent: u8) -> Self {
        let raw = self.0 * Decimal::from(percent) / Decimal::from(100u8);
        Self(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = RefundError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_validation() {
        assert!(Money::new(dec!(1.0)).is_ok());
        assert!(Money::new(dec!(0.0)).is_ok());
        assert!(matches!(
            Money::new(dec!(-1.0)),
            Err(RefundError::ValidationError(_))
        ));
    }

    #[test]
    fn test_apply_percent_exact() {
        let total = Money::new(dec!(135)).unwrap();
        assert_eq!(total.apply_percent(80), Money::new(dec!(108.00)).unwrap());
        assert_eq!(total.apply_percent(100), total);
        assert_eq!(total.apply_percent(0), Money::ZERO);
    }

    #[test]
    fn test_apply_percent_rounds_half_up() {
        // 0.01 * 50% = 0.005, rounds up to 0.01
        let total = Money::new(dec!(0.01)).unwrap();
        assert_eq!(total.apply_percent(50), Money::new(dec!(0.01)).unwrap());
        // 29.99 * 90% = 26.991, rounds to 26.99
        let total = Money::new(dec!(29.99)).unwrap();
        assert_eq!(total.apply_percent(90), Money::new(dec!(26.99)).unwrap());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(Money::new(dec!(108.00)).unwrap().to_string(), "108");
        assert_eq!(Money::new(dec!(29.98)).unwrap().to_string(), "29.98");
    }
}
