//! # Order Line
//!
//! A product snapshot plus the mutable state a cashier edits: quantity,
//! discount, unit price, tax override and the add-on ledger.
//!
//! The product is copied into the line when the line is created, the same
//! way a cart item keeps the price it was rung up at even if the catalog
//! changes afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::addon::{AddonChange, AddonEntry, AddonLedger};
use crate::catalog::{ProductCatalog, TaxTable};
use crate::error::{CoreError, CoreResult};
use crate::money::Rounding;
use crate::types::{Product, ProductId, TaxId};
use crate::validation::{validate_discount, validate_price, validate_quantity, ValidationResult};

// =============================================================================
// OrderLine
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    product: Product,
    price_unit: Decimal,
    discount: Decimal,
    quantity: Decimal,
    addon_items: AddonLedger,
    tax_ids: Option<Vec<TaxId>>,
}

impl OrderLine {
    /// Creates a line at the product's list price, without discount.
    pub fn new(product: Product, quantity: Decimal) -> ValidationResult<Self> {
        validate_quantity(quantity)?;
        Ok(OrderLine {
            price_unit: product.lst_price,
            product,
            discount: Decimal::ZERO,
            quantity,
            addon_items: AddonLedger::new(),
            tax_ids: None,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn price_unit(&self) -> Decimal {
        self.price_unit
    }

    /// Discount percentage in `[0, 100]`.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn addon_items(&self) -> &AddonLedger {
        &self.addon_items
    }

    /// Tax override set on the line, if any.
    pub fn tax_override(&self) -> Option<&[TaxId]> {
        self.tax_ids.as_deref()
    }

    /// Nominal taxes of the line: the override, or the product's taxes.
    pub fn tax_ids(&self) -> &[TaxId] {
        self.tax_ids.as_deref().unwrap_or(&self.product.taxes_id)
    }

    /// Unit of measure label of a selected add-on.
    pub fn addon_uom(&self, addon_id: ProductId) -> Option<&str> {
        self.addon_items
            .get(addon_id)
            .map(|entry| entry.addon_uom.as_str())
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    pub fn set_quantity(&mut self, quantity: Decimal) -> ValidationResult<()> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    pub fn set_discount(&mut self, discount: Decimal) -> ValidationResult<()> {
        validate_discount(discount)?;
        self.discount = discount;
        Ok(())
    }

    pub fn set_unit_price(&mut self, price: Decimal) -> ValidationResult<()> {
        validate_price(price)?;
        self.price_unit = price;
        Ok(())
    }

    /// Replaces the product's taxes on this line (`None` restores them).
    pub fn set_tax_ids(&mut self, tax_ids: Option<Vec<TaxId>>) {
        self.tax_ids = tax_ids;
    }

    /// Selects an add-on once.
    ///
    /// Returns `None` without touching the ledger when the add-on is not
    /// offered by this line's product or is missing from the catalog.
    pub fn select_addon<C>(
        &mut self,
        addon_id: ProductId,
        catalog: &C,
        rounding: Rounding,
    ) -> Option<AddonChange>
    where
        C: ProductCatalog + TaxTable + ?Sized,
    {
        if !self.product.offers_addon(addon_id) {
            warn!(
                product_id = %self.product.id,
                addon_id = %addon_id,
                "Add-on not offered by product, ignoring"
            );
            return None;
        }

        let Some(addon) = catalog.product(addon_id) else {
            warn!(addon_id = %addon_id, "Add-on missing from catalog, ignoring");
            return None;
        };

        Some(self.addon_items.add(addon, catalog, rounding))
    }

    /// Deselects an add-on once.
    pub fn deselect_addon(&mut self, addon_id: ProductId) -> AddonChange {
        self.addon_items.remove(addon_id)
    }

    pub(crate) fn clear_addons(&mut self) {
        self.addon_items = AddonLedger::new();
    }

    /// Folds `other` into this line: quantities add up, ledgers merge.
    pub(crate) fn absorb(&mut self, other: &OrderLine) {
        self.quantity += other.quantity;
        self.addon_items.merge(&other.addon_items);
    }

    // -------------------------------------------------------------------------
    // Serialization
    // -------------------------------------------------------------------------

    /// Exports the line for persistence and printing.
    pub fn export_as_json(&self) -> OrderLineJson {
        OrderLineJson {
            product_id: self.product.id,
            full_product_name: self.product.display_name.clone(),
            qty: self.quantity,
            price_unit: self.price_unit,
            discount: self.discount,
            tax_ids: self.tax_ids.clone(),
            addon_items: self.addon_items.entries().to_vec(),
        }
    }

    /// Rebuilds a line from its exported form.
    ///
    /// The product is looked up again in `catalog`; everything else comes
    /// from the document.
    pub fn from_json<C: ProductCatalog + ?Sized>(json: &OrderLineJson, catalog: &C) -> CoreResult<Self> {
        let product = catalog
            .product(json.product_id)
            .cloned()
            .ok_or(CoreError::ProductNotFound(json.product_id))?;

        let mut line = OrderLine::new(product, json.qty)?;
        line.set_unit_price(json.price_unit)?;
        line.set_discount(json.discount)?;
        line.set_tax_ids(json.tax_ids.clone());
        line.addon_items = AddonLedger::from_entries(json.addon_items.clone())?;
        Ok(line)
    }
}

/// Exported form of an [`OrderLine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineJson {
    pub product_id: ProductId,
    pub full_product_name: String,
    #[ts(as = "String")]
    pub qty: Decimal,
    #[ts(as = "String")]
    pub price_unit: Decimal,
    #[serde(default)]
    #[ts(as = "String")]
    pub discount: Decimal,
    #[serde(default)]
    pub tax_ids: Option<Vec<TaxId>>,
    #[serde(default)]
    pub addon_items: Vec<AddonEntry>,
}
