//! # Tax Engine
//!
//! Decomposes `unit_price × quantity` into per-tax amounts.
//!
//! ## Cascading
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  price 100.00, taxes in sequence order:                                 │
//! │                                                                         │
//! │    A  10 %  include_base_amount   base 100.00  → 10.00                  │
//! │    B   5 %                        base 110.00  →  5.50   (A cascades)   │
//! │    C   2 %                        base 110.00  →  2.20   (B does not)   │
//! │                                                                         │
//! │  total_excluded 100.00, total_included 117.70                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every tax amount is rounded on its own, so the included total is always
//! the exact sum of the figures printed on the receipt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::money::{percent_of, Rounding};
use crate::types::{Tax, TaxId};

/// One tax's share of a computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxLine {
    pub id: TaxId,
    pub name: String,
    /// Rounded amount of this tax.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Rounded base the percentage was applied to.
    #[ts(as = "String")]
    pub base: Decimal,
}

/// Result of [`TaxEngine::compute_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxComputation {
    #[ts(as = "String")]
    pub total_excluded: Decimal,
    #[ts(as = "String")]
    pub total_included: Decimal,
    pub taxes: Vec<TaxLine>,
}

impl TaxComputation {
    /// Sum of all tax amounts.
    pub fn total_tax(&self) -> Decimal {
        self.total_included - self.total_excluded
    }

    /// Amount per tax id. A tax listed twice has its amounts summed.
    pub fn per_tax(&self) -> BTreeMap<TaxId, Decimal> {
        let mut map = BTreeMap::new();
        for line in &self.taxes {
            *map.entry(line.id).or_insert(Decimal::ZERO) += line.amount;
        }
        map
    }
}

/// Pure tax decomposition with a fixed rounding step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxEngine {
    rounding: Rounding,
}

impl TaxEngine {
    pub fn new(rounding: Rounding) -> Self {
        TaxEngine { rounding }
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    /// Computes the excluded total, the included total and each tax amount.
    ///
    /// Taxes are applied by ascending `sequence`; equal sequences keep the
    /// order they were given in.
    pub fn compute_all(&self, taxes: &[Tax], unit_price: Decimal, quantity: Decimal) -> TaxComputation {
        let mut ordered: Vec<&Tax> = taxes.iter().collect();
        ordered.sort_by_key(|t| t.sequence);

        let total_excluded = self.rounding.round(unit_price * quantity);
        let mut base = total_excluded;
        let mut total_included = total_excluded;
        let mut lines = Vec::with_capacity(ordered.len());

        for tax in ordered {
            let amount = self.rounding.round(percent_of(base, tax.amount));
            lines.push(TaxLine {
                id: tax.id,
                name: tax.name.clone(),
                amount,
                base,
            });
            total_included += amount;

            if tax.include_base_amount {
                base += amount;
            }
        }

        TaxComputation {
            total_excluded,
            total_included,
            taxes: lines,
        }
    }
}
