//! # Validation Module
//!
//! Input validation for order lines, catalogs and configuration.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Catalog / config load ──► validate_tax_percentage, validate_name,     │
//! │                            validate_rounding_precision                 │
//! │                                                                         │
//! │  Line edits ────────────► validate_discount, validate_quantity,        │
//! │                            validate_price                              │
//! │                                                                         │
//! │  Pricing arithmetic ────► never validates: inputs are already typed    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use sidecart_core::validation::{validate_discount, validate_quantity};
//!
//! assert!(validate_discount(Decimal::new(15, 0)).is_ok());
//! assert!(validate_quantity(Decimal::ZERO).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE, MIN_ROUNDING_PRECISION};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (products, taxes, fiscal positions).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::OutOfRange {
            field: format!("{} length", field),
            min: "1".to_string(),
            max: "200".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0); fractional quantities are allowed (weighed goods)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: Decimal) -> ValidationResult<()> {
    if qty <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: "0".to_string(),
            max: MAX_LINE_QUANTITY.to_string(),
        });
    }

    Ok(())
}

/// Validates a line discount percentage: `0 <= discount <= 100`.
pub fn validate_discount(discount: Decimal) -> ValidationResult<()> {
    percentage_in_range("discount", discount)
}

/// Validates a tax percentage: `0 <= amount <= 100`.
pub fn validate_tax_percentage(amount: Decimal) -> ValidationResult<()> {
    percentage_in_range("tax amount", amount)
}

/// Validates a unit or list price.
///
/// ## Rules
/// - Must be non-negative; zero is allowed (free add-ons)
/// - Must not exceed [`MAX_UNIT_PRICE`]
pub fn validate_price(price: Decimal) -> ValidationResult<()> {
    if price < Decimal::ZERO || price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: "0".to_string(),
            max: MAX_UNIT_PRICE.to_string(),
        });
    }

    Ok(())
}

/// Validates a currency rounding precision.
///
/// ## Rules
/// - Must be positive
/// - Must not be finer than [`MIN_ROUNDING_PRECISION`]
pub fn validate_rounding_precision(precision: Decimal) -> ValidationResult<()> {
    if precision <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "rounding precision".to_string(),
        });
    }

    if precision < MIN_ROUNDING_PRECISION {
        return Err(ValidationError::OutOfRange {
            field: "rounding precision".to_string(),
            min: MIN_ROUNDING_PRECISION.to_string(),
            max: Decimal::MAX.to_string(),
        });
    }

    Ok(())
}

/// Parses a decimal from user/environment input.
pub fn parse_decimal(field: &str, raw: &str) -> ValidationResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn percentage_in_range(field: &str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }

    Ok(())
}
