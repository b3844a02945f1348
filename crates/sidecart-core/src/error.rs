//! # Error Types
//!
//! Domain-specific error types for sidecart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sidecart-core errors (this file)                                      │
//! │  ├── CoreError        - Loading / import failures                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  NOT errors (silently dropped, logged):                                │
//! │  ├── unknown tax ids                                                   │
//! │  ├── unknown or ineligible add-on ids                                  │
//! │  └── removing an add-on that is not on the line                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Price arithmetic itself never fails: a sale must not be blocked by a
//! catalog inconsistency.

use thiserror::Error;

use crate::types::{FiscalPositionId, ProductId};

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while loading configuration, catalogs or exported orders.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An imported order line references a product the catalog does not know.
    ///
    /// ## When This Occurs
    /// - Re-importing an exported order after the product was archived
    /// - Catalog file and order file come from different stores
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Fiscal position referenced by an imported order is unknown.
    #[error("Fiscal position not found: {0}")]
    FiscalPositionNotFound(FiscalPositionId),

    /// Configuration values are inconsistent.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    /// Config or catalog file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML document could not be written.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// JSON document could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used by line setters, catalog loading and config validation.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparsable decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two taxes with the same id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
