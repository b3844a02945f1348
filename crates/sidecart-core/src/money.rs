//! # Money Module
//!
//! Provides [`Rounding`], the one rounding function every monetary output
//! goes through.
//!
//! ## Why a Precision Step?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CURRENCY ROUNDING                                                      │
//! │                                                                         │
//! │  Currencies round to a step, not to a number of decimals:              │
//! │    EUR / USD   → 0.01                                                   │
//! │    CHF (cash)  → 0.05                                                   │
//! │    JPY         → 1                                                      │
//! │                                                                         │
//! │  round(x) = step × round_half_away_from_zero(x / step)                 │
//! │                                                                         │
//! │    2.675 @ 0.01 → 2.68                                                  │
//! │    2.675 @ 0.05 → 2.70                                                  │
//! │   -2.675 @ 0.01 → -2.68   (away from zero, symmetric for refunds)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use sidecart_core::money::Rounding;
//!
//! let rounding = Rounding::CENT;
//! let amount = Decimal::new(2675, 3); // 2.675
//! assert_eq!(rounding.round(amount), Decimal::new(268, 2));
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{validate_rounding_precision, ValidationResult};

// =============================================================================
// Rounding
// =============================================================================

/// Rounding precision shared process-wide (the currency's smallest step).
///
/// Every monetary output of the tax engine, the add-on ledger and the price
/// calculator is snapped with [`Rounding::round`]; call sites never round
/// on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Rounding(Decimal);

impl Rounding {
    /// One hundredth of the currency unit.
    pub const CENT: Rounding = Rounding(Decimal::from_parts(1, 0, 0, false, 2));

    /// Whole currency units.
    pub const UNIT: Rounding = Rounding(Decimal::ONE);

    /// Creates a rounding step, rejecting zero or negative precisions.
    pub fn new(precision: Decimal) -> ValidationResult<Self> {
        validate_rounding_precision(precision)?;
        Ok(Rounding(precision))
    }

    /// Returns the precision step.
    #[inline]
    pub const fn precision(&self) -> Decimal {
        self.0
    }

    /// Rounds `amount` to the nearest multiple of the precision step,
    /// midpoints away from zero.
    pub fn round(&self, amount: Decimal) -> Decimal {
        let steps = (amount / self.0)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        steps * self.0
    }

    /// Returns true if two amounts differ by less than one precision step.
    pub fn approx_eq(&self, a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < self.0
    }
}

impl Default for Rounding {
    fn default() -> Self {
        Rounding::CENT
    }
}

impl TryFrom<Decimal> for Rounding {
    type Error = crate::error::ValidationError;

    fn try_from(precision: Decimal) -> Result<Self, Self::Error> {
        Rounding::new(precision)
    }
}

impl From<Rounding> for Decimal {
    fn from(rounding: Rounding) -> Self {
        rounding.0
    }
}

impl fmt::Display for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Percentage Helpers
// =============================================================================

/// `pct` percent of `amount`, unrounded.
#[inline]
pub fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    amount * pct / Decimal::ONE_HUNDRED
}

/// Multiplier left after a percentage discount: `1 - discount/100`.
#[inline]
pub fn discount_factor(discount: Decimal) -> Decimal {
    Decimal::ONE - discount / Decimal::ONE_HUNDRED
}
