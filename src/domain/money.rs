//! Numeric types for probability and stake representation.

use rust_decimal::Decimal;

/// Implied probability, strictly inside (0, 1) once normalized.
pub type Probability = Decimal;

/// Stake amount in the bettor's currency.
pub type Stake = Decimal;
