//! # Order
//!
//! The order aggregate: lines in ring-up order, an optional fiscal position,
//! and every order-level figure derived from them.
//!
//! ## Flattening For Persistence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order                         persisted_lines()                        │
//! │  ──────────────────            ───────────────────────────────────────  │
//! │  0 Burger ×1                   Burger          is_addon=false           │
//! │      └ cheese ×2      ──►      cheese ×2       is_addon=true  parent=0  │
//! │      └ bacon  ×1               bacon  ×1       is_addon=true  parent=0  │
//! │  1 Cola ×2                     Cola ×2         is_addon=false           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never stored; every call recomputes them through a
//! [`PricingStrategy`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::addon::AddonEntry;
use crate::catalog::{FiscalPositions, ProductCatalog, TaxTable};
use crate::config::PricingConfig;
use crate::error::{CoreError, CoreResult};
use crate::merge::MergePolicy;
use crate::order_line::{OrderLine, OrderLineJson};
use crate::pricing::{PriceCalculator, PricingStrategy};
use crate::types::{FiscalPosition, FiscalPositionId, ProductId, TaxId};

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone)]
pub struct Order {
    uid: Uuid,
    created_at: DateTime<Utc>,
    fiscal_position: Option<FiscalPosition>,
    lines: Vec<OrderLine>,
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Order {
    pub fn new() -> Self {
        Order {
            uid: Uuid::new_v4(),
            created_at: Utc::now(),
            fiscal_position: None,
            lines: Vec::new(),
        }
    }

    pub fn uid(&self) -> Uuid {
        self.uid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn fiscal_position(&self) -> Option<&FiscalPosition> {
        self.fiscal_position.as_ref()
    }

    pub fn set_fiscal_position(&mut self, fiscal_position: Option<FiscalPosition>) {
        self.fiscal_position = fiscal_position;
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut OrderLine> {
        self.lines.get_mut(index)
    }

    pub fn remove_line(&mut self, index: usize) -> Option<OrderLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds a line, folding it into the last line when the merge policy allows.
    ///
    /// Returns the index of the line that now holds it.
    pub fn add_line(&mut self, line: OrderLine) -> usize {
        if let Some(last) = self.lines.last_mut() {
            if MergePolicy::can_merge(last, &line) {
                last.absorb(&line);
                debug!(
                    product_id = %line.product().id,
                    quantity = %last.quantity(),
                    "Merged line into previous line"
                );
                return self.lines.len() - 1;
            }
        }

        self.lines.push(line);
        self.lines.len() - 1
    }

    /// Calculator bound to this order's fiscal position.
    pub fn price_calculator<'a, T: TaxTable + ?Sized>(
        &'a self,
        taxes: &'a T,
        config: &PricingConfig,
    ) -> PriceCalculator<'a, T> {
        PriceCalculator::from_config(taxes, config).with_fiscal_position(self.fiscal_position())
    }

    // -------------------------------------------------------------------------
    // Totals
    // -------------------------------------------------------------------------

    /// All order-level figures in one pass.
    pub fn totals<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> OrderTotals {
        let mut totals = OrderTotals::default();

        for line in &self.lines {
            let prices = strategy.all_prices(line);
            totals.total_with_tax += prices.price_with_tax;
            totals.total_without_tax += prices.price_without_tax;
            totals.total_tax += prices.tax;
            for (id, amount) in prices.tax_details {
                *totals.tax_details.entry(id).or_insert(Decimal::ZERO) += amount;
            }
        }

        totals
    }

    /// Tax-exclusive total; add-ons with an inclusive tax count net of it.
    pub fn total_without_tax<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> Decimal {
        self.totals(strategy).total_without_tax
    }

    pub fn total_with_tax<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> Decimal {
        self.totals(strategy).total_with_tax
    }

    pub fn total_tax<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> Decimal {
        self.totals(strategy).total_tax
    }

    pub fn tax_details<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> BTreeMap<TaxId, Decimal> {
        self.totals(strategy).tax_details
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Flattens lines and their add-ons into persisted order lines.
    ///
    /// Each line is followed by one row per add-on entry. Main rows carry the
    /// product part of the line only; add-on rows carry what the strategy
    /// charges for the entry, so the rows always sum to the order totals.
    pub fn persisted_lines<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> Vec<PersistedLine> {
        let mut rows = Vec::new();

        for (index, line) in self.lines.iter().enumerate() {
            let mut bare = line.clone();
            bare.clear_addons();
            let product = strategy.all_prices(&bare);

            rows.push(PersistedLine {
                parent_index: None,
                is_addon: false,
                product_id: line.product().id,
                full_product_name: line.product().display_name.clone(),
                qty: line.quantity(),
                price_unit: line.price_unit(),
                discount: line.discount(),
                price_subtotal: product.price_without_tax,
                price_subtotal_incl: product.price_with_tax,
                uom: line.product().uom.name.clone(),
                tax_ids: line.tax_ids().to_vec(),
            });

            for entry in line.addon_items().entries() {
                let charged = strategy.addon_prices(line, entry);
                rows.push(PersistedLine {
                    parent_index: Some(index),
                    is_addon: true,
                    product_id: entry.addon_id,
                    full_product_name: entry.addon_name.clone(),
                    qty: Decimal::from(entry.addon_count),
                    price_unit: entry.addon_price_without,
                    discount: charged.discount,
                    price_subtotal: charged.price_without_tax,
                    price_subtotal_incl: charged.price_with_tax,
                    uom: entry.addon_uom.clone(),
                    tax_ids: entry.tax.into_iter().collect(),
                });
            }
        }

        rows
    }

    /// Receipt data, one entry per line.
    pub fn export_for_printing<S: PricingStrategy + ?Sized>(&self, strategy: &S) -> Vec<LineReceipt> {
        self.lines
            .iter()
            .map(|line| {
                let prices = strategy.all_prices(line);
                LineReceipt {
                    quantity: line.quantity(),
                    unit_name: line.product().uom.name.clone(),
                    product_name: line.product().display_name.clone(),
                    product_description: line.product().description.clone(),
                    price_unit: line.price_unit(),
                    discount: line.discount(),
                    price_display: strategy.display_price(line),
                    price_with_tax: prices.price_with_tax,
                    price_without_tax: prices.price_without_tax,
                    price_with_tax_before_discount: prices.price_with_tax_before_discount,
                    tax: prices.tax,
                    addon_items: line.addon_items().entries().to_vec(),
                }
            })
            .collect()
    }

    pub fn export_as_json(&self) -> OrderJson {
        OrderJson {
            uid: self.uid,
            created_at: self.created_at,
            fiscal_position_id: self.fiscal_position.as_ref().map(|fp| fp.id),
            lines: self.lines.iter().map(OrderLine::export_as_json).collect(),
        }
    }

    /// Rebuilds an order from its exported form. Lines are kept as-is, never merged.
    pub fn from_json<C>(json: &OrderJson, catalog: &C) -> CoreResult<Self>
    where
        C: ProductCatalog + FiscalPositions + ?Sized,
    {
        let fiscal_position = match json.fiscal_position_id {
            Some(id) => Some(
                catalog
                    .fiscal_position(id)
                    .cloned()
                    .ok_or(CoreError::FiscalPositionNotFound(id))?,
            ),
            None => None,
        };

        let lines = json
            .lines
            .iter()
            .map(|line| OrderLine::from_json(line, catalog))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Order {
            uid: json.uid,
            created_at: json.created_at,
            fiscal_position,
            lines,
        })
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// Order-level figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    #[ts(as = "String")]
    pub total_without_tax: Decimal,
    #[ts(as = "String")]
    pub total_with_tax: Decimal,
    #[ts(as = "String")]
    pub total_tax: Decimal,
    #[ts(as = "BTreeMap<TaxId, String>")]
    pub tax_details: BTreeMap<TaxId, Decimal>,
}

/// One persisted order line; add-ons become rows of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersistedLine {
    /// Index of the main line an add-on row belongs to.
    pub parent_index: Option<usize>,
    pub is_addon: bool,
    pub product_id: ProductId,
    pub full_product_name: String,
    #[ts(as = "String")]
    pub qty: Decimal,
    #[ts(as = "String")]
    pub price_unit: Decimal,
    #[ts(as = "String")]
    pub discount: Decimal,
    #[ts(as = "String")]
    pub price_subtotal: Decimal,
    #[ts(as = "String")]
    pub price_subtotal_incl: Decimal,
    pub uom: String,
    pub tax_ids: Vec<TaxId>,
}

/// Receipt data of one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineReceipt {
    #[ts(as = "String")]
    pub quantity: Decimal,
    pub unit_name: String,
    pub product_name: String,
    pub product_description: Option<String>,
    #[ts(as = "String")]
    pub price_unit: Decimal,
    #[ts(as = "String")]
    pub discount: Decimal,
    #[ts(as = "String")]
    pub price_display: Decimal,
    #[ts(as = "String")]
    pub price_with_tax: Decimal,
    #[ts(as = "String")]
    pub price_without_tax: Decimal,
    #[ts(as = "String")]
    pub price_with_tax_before_discount: Decimal,
    #[ts(as = "String")]
    pub tax: Decimal,
    pub addon_items: Vec<AddonEntry>,
}

/// Exported form of an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderJson {
    #[ts(as = "String")]
    pub uid: Uuid,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fiscal_position_id: Option<FiscalPositionId>,
    #[serde(default)]
    pub lines: Vec<OrderLineJson>,
}
