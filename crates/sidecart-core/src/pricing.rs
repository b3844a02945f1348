//! # Pricing
//!
//! Line-level price figures. [`PricingStrategy`] is the seam the order and
//! the host call through; [`PriceCalculator`] is the implementation.
//!
//! ## Figures
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  product part   price_unit × qty × (1 − d/100)  ──► TaxEngine           │
//! │  add-on part    Σ entry totals (already unit × count)                   │
//! │                                                                         │
//! │  base_price       product excl. + Σ total_without                       │
//! │  price_with_tax   product incl. + Σ total_with                          │
//! │  all_prices       both of the above, plus per-tax breakdown             │
//! │  display_price    price_with_tax or base_price, per TaxMode             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Scope
//! With [`DiscountScope::ProductOnly`] (default) the line discount reduces
//! the product part only and add-ons are charged in full. With
//! [`DiscountScope::WholeLine`] every add-on figure is scaled by the same
//! `(1 − d/100)` factor before it is summed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::addon::AddonEntry;
use crate::catalog::TaxTable;
use crate::config::PricingConfig;
use crate::error::ValidationError;
use crate::money::{discount_factor, Rounding};
use crate::order_line::OrderLine;
use crate::tax::{TaxComputation, TaxEngine, TaxResolver};
use crate::types::{FiscalPosition, TaxId, TaxMode};

// =============================================================================
// DiscountScope
// =============================================================================

/// What a line discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountScope {
    /// Discount the product; add-ons stay at full price.
    #[default]
    ProductOnly,
    /// Discount the product and its add-ons alike.
    WholeLine,
}

impl fmt::Display for DiscountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountScope::ProductOnly => write!(f, "product_only"),
            DiscountScope::WholeLine => write!(f, "whole_line"),
        }
    }
}

impl FromStr for DiscountScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "product_only" | "product" => Ok(DiscountScope::ProductOnly),
            "whole_line" | "line" => Ok(DiscountScope::WholeLine),
            other => Err(ValidationError::InvalidFormat {
                field: "discount_scope".to_string(),
                reason: format!("unknown scope '{}', expected product_only or whole_line", other),
            }),
        }
    }
}

// =============================================================================
// LinePrices
// =============================================================================

/// Full price breakdown of one line.
///
/// `price_with_tax − price_without_tax == tax == Σ tax_details` holds exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LinePrices {
    #[ts(as = "String")]
    pub price_with_tax: Decimal,
    /// Tax-exclusive total; add-ons with an inclusive tax count net of it.
    #[ts(as = "String")]
    pub price_without_tax: Decimal,
    #[ts(as = "String")]
    pub price_with_tax_before_discount: Decimal,
    #[ts(as = "String")]
    pub tax: Decimal,
    /// Tax amount per tax id, product and add-ons together.
    #[ts(as = "BTreeMap<TaxId, String>")]
    pub tax_details: BTreeMap<TaxId, Decimal>,
    /// Tax the discount removed, per tax id (list price tax − discounted tax).
    #[ts(as = "BTreeMap<TaxId, String>")]
    pub discount_tax_effect: BTreeMap<TaxId, Decimal>,
}

// =============================================================================
// PricingStrategy
// =============================================================================

/// Price figures of an order line.
///
/// Implementations must be pure: the same line always yields the same figures.
pub trait PricingStrategy {
    /// Tax-exclusive line total, add-ons included.
    fn base_price(&self, line: &OrderLine) -> Decimal;

    /// Tax-inclusive line total, add-ons included.
    fn price_with_tax(&self, line: &OrderLine) -> Decimal;

    /// Every figure at once, with the per-tax breakdown.
    fn all_prices(&self, line: &OrderLine) -> LinePrices;

    /// The figure shown on screen for the line.
    fn display_price(&self, line: &OrderLine) -> Decimal;

    /// What one add-on entry of `line` is charged, after any line discount.
    fn addon_prices(&self, line: &OrderLine, entry: &AddonEntry) -> AddonPrices;
}

/// Charged figures of one add-on entry on its line.
///
/// Summed over a line's entries, these are exactly the add-on part of
/// [`PricingStrategy::all_prices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddonPrices {
    /// Discount percentage applied to the entry (zero unless the whole line
    /// is discounted).
    pub discount: Decimal,
    pub price_without_tax: Decimal,
    pub price_with_tax: Decimal,
    pub tax: Decimal,
    pub tax_id: Option<TaxId>,
}

// =============================================================================
// PriceCalculator
// =============================================================================

/// [`PricingStrategy`] backed by a tax table and an optional fiscal position.
pub struct PriceCalculator<'a, T: TaxTable + ?Sized> {
    taxes: &'a T,
    fiscal_position: Option<&'a FiscalPosition>,
    rounding: Rounding,
    tax_mode: TaxMode,
    discount_scope: DiscountScope,
}

impl<'a, T: TaxTable + ?Sized> PriceCalculator<'a, T> {
    /// Calculator with cent rounding, exclusive display and product-only discounts.
    pub fn new(taxes: &'a T) -> Self {
        PriceCalculator {
            taxes,
            fiscal_position: None,
            rounding: Rounding::default(),
            tax_mode: TaxMode::default(),
            discount_scope: DiscountScope::default(),
        }
    }

    /// Calculator configured from a [`PricingConfig`].
    pub fn from_config(taxes: &'a T, config: &PricingConfig) -> Self {
        PriceCalculator::new(taxes)
            .with_rounding(config.currency.rounding)
            .with_tax_mode(config.tax_mode)
            .with_discount_scope(config.discount_scope)
    }

    pub fn with_fiscal_position(mut self, fiscal_position: Option<&'a FiscalPosition>) -> Self {
        self.fiscal_position = fiscal_position;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_tax_mode(mut self, tax_mode: TaxMode) -> Self {
        self.tax_mode = tax_mode;
        self
    }

    pub fn with_discount_scope(mut self, discount_scope: DiscountScope) -> Self {
        self.discount_scope = discount_scope;
        self
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Runs the product part of `line` through the tax engine.
    fn product_taxes(&self, line: &OrderLine, discounted: bool) -> TaxComputation {
        let taxes = TaxResolver::new(self.taxes, self.fiscal_position).resolve(line.tax_ids());
        let unit = if discounted {
            line.price_unit() * discount_factor(line.discount())
        } else {
            line.price_unit()
        };
        TaxEngine::new(self.rounding).compute_all(&taxes, unit, line.quantity())
    }

    /// Discount percentage add-ons of `line` are charged with.
    fn addon_discount(&self, line: &OrderLine) -> Decimal {
        match self.discount_scope {
            DiscountScope::ProductOnly => Decimal::ZERO,
            DiscountScope::WholeLine => line.discount(),
        }
    }

    /// Tax-exclusive total of one entry, before any line discount.
    ///
    /// An inclusive first tax is taken out of the list price.
    fn addon_total_without_tax(&self, entry: &AddonEntry) -> Decimal {
        let inclusive = entry
            .tax
            .and_then(|id| self.taxes.tax(id))
            .map(|t| t.include_base_amount)
            .unwrap_or(false);

        if inclusive {
            entry.total_without_including
        } else {
            entry.total_without
        }
    }
}

impl<'a, T: TaxTable + ?Sized> PricingStrategy for PriceCalculator<'a, T> {
    fn base_price(&self, line: &OrderLine) -> Decimal {
        let product = line.price_unit() * line.quantity();
        let addons = line.addon_items().total_without();
        let factor = discount_factor(line.discount());

        let total = match self.discount_scope {
            DiscountScope::ProductOnly => product * factor + addons,
            DiscountScope::WholeLine => (product + addons) * factor,
        };
        self.rounding.round(total)
    }

    fn price_with_tax(&self, line: &OrderLine) -> Decimal {
        let addons: Decimal = line
            .addon_items()
            .entries()
            .iter()
            .map(|e| self.addon_prices(line, e).price_with_tax)
            .sum();
        self.product_taxes(line, true).total_included + addons
    }

    fn all_prices(&self, line: &OrderLine) -> LinePrices {
        let discounted = self.product_taxes(line, true);
        let at_list = self.product_taxes(line, false);

        let mut tax_details = discounted.per_tax();
        let discount_tax_effect = at_list
            .per_tax()
            .into_iter()
            .map(|(id, list_amount)| {
                let after = tax_details.get(&id).copied().unwrap_or(Decimal::ZERO);
                (id, list_amount - after)
            })
            .collect();

        let mut prices = LinePrices {
            price_with_tax: discounted.total_included,
            price_without_tax: discounted.total_excluded,
            price_with_tax_before_discount: at_list.total_included,
            tax: discounted.total_tax(),
            tax_details: BTreeMap::new(),
            discount_tax_effect,
        };

        for entry in line.addon_items().entries() {
            let figures = self.addon_prices(line, entry);
            prices.price_with_tax += figures.price_with_tax;
            prices.price_without_tax += figures.price_without_tax;
            prices.price_with_tax_before_discount += self.rounding.round(entry.total_with);
            prices.tax += figures.tax;

            if let Some(id) = figures.tax_id {
                *tax_details.entry(id).or_insert(Decimal::ZERO) += figures.tax;
            }
        }

        prices.tax_details = tax_details;
        prices
    }

    fn display_price(&self, line: &OrderLine) -> Decimal {
        match self.tax_mode {
            TaxMode::Inclusive => self.price_with_tax(line),
            TaxMode::Exclusive => self.base_price(line),
        }
    }

    fn addon_prices(&self, line: &OrderLine, entry: &AddonEntry) -> AddonPrices {
        let discount = self.addon_discount(line);
        let scale = discount_factor(discount);
        let price_with_tax = self.rounding.round(entry.total_with * scale);
        let price_without_tax = self.rounding.round(self.addon_total_without_tax(entry) * scale);

        AddonPrices {
            discount,
            price_without_tax,
            price_with_tax,
            tax: price_with_tax - price_without_tax,
            tax_id: entry.tax,
        }
    }
}
