//! # Tax Module
//!
//! Two steps turn a line's nominal tax ids into amounts:
//!
//! ```text
//!   nominal tax ids ──► TaxResolver ──► effective taxes ──► TaxEngine ──► TaxComputation
//!                        (fiscal position,                   (cascading,
//!                         unknown ids dropped)                per-tax rounding)
//! ```

pub mod engine;
pub mod resolver;

pub use engine::{TaxComputation, TaxEngine, TaxLine};
pub use resolver::TaxResolver;
