//! # sidecart-core: Order-Line Pricing for Sidecart POS
//!
//! This crate computes every price and tax figure of a point-of-sale order
//! line that carries selectable add-ons (extra cheese, a side, a gift box).
//! Everything here is deterministic arithmetic over typed inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sidecart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Host POS (screens, numpad, fiscal printer)             │   │
//! │  │     select add-on ──► show line price ──► print receipt         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain method calls                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ sidecart-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   addon   │  │    tax    │  │  pricing  │  │   order   │  │   │
//! │  │   │  Ledger   │  │ Resolver  │  │ Calculator│  │  totals   │  │   │
//! │  │   │  entries  │  │  Engine   │  │  Strategy │  │  receipt  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO NETWORK • NO UI                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ traits                                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   ProductCatalog / TaxTable / FiscalPositions (host supplied)   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog types (Product, Tax, FiscalPosition, ids)
//! - [`money`] - Currency rounding with exact decimals
//! - [`tax`] - Fiscal-position resolution and tax decomposition
//! - [`addon`] - Per-line add-on ledger
//! - [`pricing`] - Line price calculator
//! - [`merge`] - Line merge policy
//! - [`order_line`] - Order line and its JSON form
//! - [`order`] - Order aggregate, persisted lines, receipt data
//! - [`catalog`] - Collaborator traits and an in-memory catalog
//! - [`config`] - Pricing configuration
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use sidecart_core::catalog::PosCatalog;
//! use sidecart_core::order_line::OrderLine;
//! use sidecart_core::pricing::{PriceCalculator, PricingStrategy};
//! use sidecart_core::types::{Product, ProductId, UnitOfMeasure};
//!
//! let burger = Product {
//!     id: ProductId::new(1),
//!     display_name: "Burger".to_string(),
//!     lst_price: Decimal::new(1000, 2),
//!     taxes_id: vec![],
//!     uom: UnitOfMeasure::default(),
//!     is_addon_include: false,
//!     addon_ids: vec![],
//!     description: None,
//! };
//!
//! let catalog = PosCatalog::new();
//! let line = OrderLine::new(burger, Decimal::new(2, 0)).unwrap();
//! let calculator = PriceCalculator::new(&catalog);
//!
//! assert_eq!(calculator.base_price(&line), Decimal::new(2000, 2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod addon;
pub mod catalog;
pub mod config;
pub mod error;
pub mod merge;
pub mod money;
pub mod order;
pub mod order_line;
pub mod pricing;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use addon::{AddonChange, AddonEntry, AddonLedger, LedgerState};
pub use catalog::{FiscalPositions, PosCatalog, ProductCatalog, TaxTable};
pub use config::PricingConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use merge::MergePolicy;
pub use money::Rounding;
pub use order::Order;
pub use order_line::OrderLine;
pub use pricing::{AddonPrices, DiscountScope, LinePrices, PriceCalculator, PricingStrategy};
pub use tax::{TaxComputation, TaxEngine, TaxResolver};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

use rust_decimal::Decimal;

/// Maximum quantity of a single order line.
///
/// Catches fat-finger entries (1000 typed instead of 10) without blocking
/// weighed goods, which use fractional quantities.
pub const MAX_LINE_QUANTITY: Decimal = Decimal::from_parts(9999, 0, 0, false, 0);

/// Maximum unit or list price.
///
/// Keeps `price × quantity` and add-on totals far inside `Decimal` range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Finest accepted rounding step (0.000001).
///
/// `Rounding::round` divides by the step; a finer one overflows on
/// ordinary amounts.
pub const MIN_ROUNDING_PRECISION: Decimal = Decimal::from_parts(1, 0, 0, false, 6);
