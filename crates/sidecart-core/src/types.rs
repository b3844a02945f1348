//! # Domain Types
//!
//! Catalog-side types the pricing engine consumes.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │    Product      │   │      Tax        │   │   FiscalPosition     │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  id             │   │  id             │   │  id                  │  │
//! │  │  lst_price      │──►│  amount (%)     │◄──│  tax_mappings        │  │
//! │  │  taxes_id       │   │  include_base_  │   │   src ──► dest       │  │
//! │  │  uom            │   │    amount       │   └──────────────────────┘  │
//! │  │  addon_ids ─┐   │   │  sequence       │                             │
//! │  └─────────────┼───┘   └─────────────────┘                             │
//! │                └──► other Products selectable as add-ons               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are small integer newtypes; the host catalog owns the numbering.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[serde(transparent)]
        #[ts(export)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(id: u32) -> Self {
                $name(id)
            }

            #[inline]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a tax in the tax table.
    TaxId
);
id_type!(
    /// Identifier of a product (main products and add-ons alike).
    ProductId
);
id_type!(
    /// Identifier of a fiscal position.
    FiscalPositionId
);

// =============================================================================
// Tax
// =============================================================================

/// A tax from the ordered tax table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tax {
    pub id: TaxId,

    pub name: String,

    /// Percentage, e.g. `10` for 10 %.
    #[ts(as = "String")]
    pub amount: Decimal,

    /// When set, this tax's amount becomes part of the base of every later
    /// tax in the chain (cascading taxes).
    #[serde(default)]
    pub include_base_amount: bool,

    /// Position in the tax table. Taxes are applied by ascending sequence.
    #[serde(default)]
    pub sequence: u32,
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// Unit of measure attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitOfMeasure {
    /// Label printed next to quantities ("Units", "Slices", "kg").
    pub name: String,

    /// Quantity a fresh add-on selection starts with.
    #[serde(default = "default_step")]
    pub default_step: u32,
}

fn default_step() -> u32 {
    1
}

impl Default for UnitOfMeasure {
    fn default() -> Self {
        UnitOfMeasure {
            name: "Units".to_string(),
            default_step: default_step(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product, as supplied by the host catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: ProductId,

    pub display_name: String,

    /// Unit list price, tax excluded.
    #[ts(as = "String")]
    pub lst_price: Decimal,

    /// Nominal taxes, in catalog order.
    #[serde(default)]
    pub taxes_id: Vec<TaxId>,

    #[serde(default)]
    pub uom: UnitOfMeasure,

    /// The product offers selectable add-ons. Lines of such products never merge.
    #[serde(default)]
    pub is_addon_include: bool,

    /// Products that may be selected as add-ons on this product's lines.
    #[serde(default)]
    pub addon_ids: Vec<ProductId>,

    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Returns true if `addon_id` is listed as an add-on of this product.
    pub fn offers_addon(&self, addon_id: ProductId) -> bool {
        self.addon_ids.contains(&addon_id)
    }

    /// The first nominal tax; add-on prices only ever look at this one.
    pub fn first_tax_id(&self) -> Option<TaxId> {
        self.taxes_id.first().copied()
    }
}

// =============================================================================
// Fiscal Position
// =============================================================================

/// One row of a fiscal position: replace `tax_src_id` by `tax_dest_id`.
///
/// A row without destination removes the source tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiscalPositionTax {
    pub tax_src_id: TaxId,
    #[serde(default)]
    pub tax_dest_id: Option<TaxId>,
}

/// Tax remapping rule set (e.g., domestic vs. export).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FiscalPosition {
    pub id: FiscalPositionId,
    pub name: String,
    #[serde(default)]
    pub tax_mappings: Vec<FiscalPositionTax>,
}

impl FiscalPosition {
    /// All mapping rows whose source is `tax_id`, in declaration order.
    pub fn mappings_for(&self, tax_id: TaxId) -> impl Iterator<Item = &FiscalPositionTax> {
        self.tax_mappings
            .iter()
            .filter(move |m| m.tax_src_id == tax_id)
    }
}

// =============================================================================
// Configuration Types
// =============================================================================

/// Which price a line displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxMode {
    /// Display the tax-exclusive base price.
    #[default]
    #[serde(alias = "subtotal")]
    Exclusive,
    /// Display the tax-inclusive price.
    #[serde(alias = "total")]
    Inclusive,
}

impl fmt::Display for TaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxMode::Exclusive => write!(f, "exclusive"),
            TaxMode::Inclusive => write!(f, "inclusive"),
        }
    }
}

impl FromStr for TaxMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclusive" | "excluded" | "subtotal" => Ok(TaxMode::Exclusive),
            "inclusive" | "included" | "total" => Ok(TaxMode::Inclusive),
            other => Err(ValidationError::InvalidFormat {
                field: "tax_mode".to_string(),
                reason: format!("unknown mode '{}', expected exclusive or inclusive", other),
            }),
        }
    }
}
