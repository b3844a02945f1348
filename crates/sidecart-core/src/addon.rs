//! # Add-on Ledger
//!
//! Every order line owns one [`AddonLedger`]: the add-ons selected on it,
//! one entry per add-on product, in selection order.
//!
//! ## Entry Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   (absent) ──add──► count = uom.default_step ──add──► count + 1        │
//! │       ▲                        │                          │             │
//! │       │                        ▼                          ▼             │
//! │       └──remove (count == 1)── entry ◄──remove (count > 1)─┘            │
//! │                                                                         │
//! │   Totals are always unit value × count, rebuilt after every change.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unit Values
//! Only the add-on product's *first* tax is considered:
//!
//! | first tax              | `addon_price_with`        | `addon_price_without_including` |
//! |------------------------|---------------------------|---------------------------------|
//! | none / unknown         | list                      | list                            |
//! | `include_base_amount`  | list                      | round(list / (1 + pct/100))     |
//! | otherwise              | round(list × (1 + pct/100)) | list                          |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use ts_rs::TS;

use crate::catalog::TaxTable;
use crate::error::ValidationError;
use crate::money::{percent_of, Rounding};
use crate::types::{Product, ProductId, Tax, TaxId};
use crate::validation::{validate_price, ValidationResult};

// =============================================================================
// AddonEntry
// =============================================================================

/// One selected add-on on a line.
///
/// Field names are the persisted `addon_items` wire names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonEntry {
    pub addon_id: ProductId,
    pub addon_name: String,

    /// List price of one unit.
    #[ts(as = "String")]
    pub addon_price_without: Decimal,
    /// Unit price with tax.
    #[ts(as = "String")]
    pub addon_price_with: Decimal,
    /// Unit price with an inclusive tax taken out.
    #[ts(as = "String")]
    pub addon_price_without_including: Decimal,

    pub addon_uom: String,
    pub addon_count: u32,

    #[ts(as = "String")]
    pub total_without: Decimal,
    #[ts(as = "String")]
    pub total_without_including: Decimal,
    #[ts(as = "String")]
    pub total_with: Decimal,

    /// First tax of the add-on product, when the tax table knows it.
    pub tax: Option<TaxId>,
}

impl AddonEntry {
    /// Creates an entry for `addon` with `count` units.
    pub fn new(addon: &Product, tax: Option<&Tax>, count: u32, rounding: Rounding) -> Self {
        let list = addon.lst_price;

        let (price_with, price_without_including) = match tax {
            Some(t) if t.include_base_amount => {
                let divisor = Decimal::ONE + t.amount / Decimal::ONE_HUNDRED;
                (list, rounding.round(list / divisor))
            }
            Some(t) => (rounding.round(list + percent_of(list, t.amount)), list),
            None => (list, list),
        };

        let mut entry = AddonEntry {
            addon_id: addon.id,
            addon_name: addon.display_name.clone(),
            addon_price_without: list,
            addon_price_with: price_with,
            addon_price_without_including: price_without_including,
            addon_uom: addon.uom.name.clone(),
            addon_count: count.max(1),
            total_without: Decimal::ZERO,
            total_without_including: Decimal::ZERO,
            total_with: Decimal::ZERO,
            tax: tax.map(|t| t.id),
        };
        entry.recompute_totals();
        entry
    }

    /// Rebuilds the running totals from unit values and count.
    fn recompute_totals(&mut self) {
        let count = Decimal::from(self.addon_count);
        self.total_without = self.addon_price_without * count;
        self.total_without_including = self.addon_price_without_including * count;
        self.total_with = self.addon_price_with * count;
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Whether a ledger holds any entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    Empty,
    NonEmpty,
}

/// What a ledger mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonChange {
    /// A new entry was created.
    Added { addon_id: ProductId, count: u32 },
    /// An existing entry's count went up.
    Incremented { addon_id: ProductId, count: u32 },
    /// An existing entry's count went down.
    Decremented { addon_id: ProductId, count: u32 },
    /// The entry was deleted.
    Removed { addon_id: ProductId },
    /// Nothing to do: the add-on is not on the line.
    NotPresent { addon_id: ProductId },
}

/// Add-on entries of one order line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonLedger {
    entries: Vec<AddonEntry>,
}

impl AddonLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted entries.
    ///
    /// Rejects zero counts, repeated add-on ids and out-of-range unit
    /// prices; totals are recomputed.
    pub fn from_entries(entries: Vec<AddonEntry>) -> ValidationResult<Self> {
        let mut seen = HashSet::new();
        let mut ledger = AddonLedger::new();

        for mut entry in entries {
            if entry.addon_count == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "addon_count".to_string(),
                });
            }
            if !seen.insert(entry.addon_id) {
                return Err(ValidationError::Duplicate {
                    field: "addon_id".to_string(),
                    value: entry.addon_id.to_string(),
                });
            }
            validate_price(entry.addon_price_without)?;
            validate_price(entry.addon_price_with)?;
            validate_price(entry.addon_price_without_including)?;
            entry.recompute_totals();
            ledger.entries.push(entry);
        }

        Ok(ledger)
    }

    /// Selects `addon` once more.
    pub fn add<T: TaxTable + ?Sized>(
        &mut self,
        addon: &Product,
        taxes: &T,
        rounding: Rounding,
    ) -> AddonChange {
        let change = if let Some(entry) = self.get_mut(addon.id) {
            entry.addon_count = entry.addon_count.saturating_add(1);
            entry.recompute_totals();
            AddonChange::Incremented {
                addon_id: addon.id,
                count: entry.addon_count,
            }
        } else {
            let tax = addon.first_tax_id().and_then(|id| taxes.tax(id));
            let entry = AddonEntry::new(addon, tax, addon.uom.default_step, rounding);
            let count = entry.addon_count;
            self.entries.push(entry);
            AddonChange::Added {
                addon_id: addon.id,
                count,
            }
        };

        debug!(?change, "Add-on selected");
        change
    }

    /// Deselects `addon_id` once.
    pub fn remove(&mut self, addon_id: ProductId) -> AddonChange {
        let change = match self.entries.iter().position(|e| e.addon_id == addon_id) {
            None => AddonChange::NotPresent { addon_id },
            Some(idx) if self.entries[idx].addon_count > 1 => {
                let entry = &mut self.entries[idx];
                entry.addon_count -= 1;
                entry.recompute_totals();
                AddonChange::Decremented {
                    addon_id,
                    count: entry.addon_count,
                }
            }
            Some(idx) => {
                self.entries.remove(idx);
                AddonChange::Removed { addon_id }
            }
        };

        debug!(?change, "Add-on deselected");
        change
    }

    /// Folds another ledger's entries into this one.
    ///
    /// Counts of shared add-ons are summed; new add-ons are appended in the
    /// other ledger's order.
    pub fn merge(&mut self, other: &AddonLedger) -> Vec<AddonChange> {
        let mut changes = Vec::with_capacity(other.entries.len());

        for incoming in &other.entries {
            let change = if let Some(entry) = self.get_mut(incoming.addon_id) {
                entry.addon_count = entry.addon_count.saturating_add(incoming.addon_count);
                entry.recompute_totals();
                AddonChange::Incremented {
                    addon_id: entry.addon_id,
                    count: entry.addon_count,
                }
            } else {
                self.entries.push(incoming.clone());
                AddonChange::Added {
                    addon_id: incoming.addon_id,
                    count: incoming.addon_count,
                }
            };
            changes.push(change);
        }

        debug!(merged = changes.len(), "Merged add-on ledgers");
        changes
    }

    pub fn state(&self) -> LedgerState {
        if self.entries.is_empty() {
            LedgerState::Empty
        } else {
            LedgerState::NonEmpty
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in selection order.
    pub fn entries(&self) -> &[AddonEntry] {
        &self.entries
    }

    pub fn get(&self, addon_id: ProductId) -> Option<&AddonEntry> {
        self.entries.iter().find(|e| e.addon_id == addon_id)
    }

    fn get_mut(&mut self, addon_id: ProductId) -> Option<&mut AddonEntry> {
        self.entries.iter_mut().find(|e| e.addon_id == addon_id)
    }

    /// Σ `total_without` over all entries.
    pub fn total_without(&self) -> Decimal {
        self.entries.iter().map(|e| e.total_without).sum()
    }

    /// Σ `total_with` over all entries.
    pub fn total_with(&self) -> Decimal {
        self.entries.iter().map(|e| e.total_with).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PosCatalog;
    use crate::types::UnitOfMeasure;
    use rust_decimal_macros::dec;

    fn addon(id: u32, price: Decimal, tax: Option<u32>, step: u32) -> Product {
        Product {
            id: ProductId::new(id),
            display_name: format!("Addon {}", id),
            lst_price: price,
            taxes_id: tax.map(TaxId::new).into_iter().collect(),
            uom: UnitOfMeasure {
                name: "Units".to_string(),
                default_step: step,
            },
            is_addon_include: false,
            addon_ids: vec![],
            description: None,
        }
    }

    fn taxes() -> PosCatalog {
        let mut catalog = PosCatalog::new();
        catalog
            .add_tax(Tax {
                id: TaxId::new(1),
                name: "VAT 10%".to_string(),
                amount: dec!(10),
                include_base_amount: false,
                sequence: 1,
            })
            .unwrap();
        catalog
            .add_tax(Tax {
                id: TaxId::new(2),
                name: "VAT 10% incl.".to_string(),
                amount: dec!(10),
                include_base_amount: true,
                sequence: 2,
            })
            .unwrap();
        catalog
    }

    #[test]
    fn test_add_creates_then_increments() {
        let table = taxes();
        let cheese = addon(5, dec!(3.00), None, 1);
        let mut ledger = AddonLedger::new();

        assert_eq!(ledger.state(), LedgerState::Empty);
        assert_eq!(
            ledger.add(&cheese, &table, Rounding::CENT),
            AddonChange::Added {
                addon_id: cheese.id,
                count: 1
            }
        );
        assert_eq!(
            ledger.add(&cheese, &table, Rounding::CENT),
            AddonChange::Incremented {
                addon_id: cheese.id,
                count: 2
            }
        );

        let entry = ledger.get(cheese.id).unwrap();
        assert_eq!(entry.total_without, dec!(6.00));
        assert_eq!(entry.total_with, dec!(6.00));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.state(), LedgerState::NonEmpty);
    }

    #[test]
    fn test_first_entry_uses_default_step() {
        let table = taxes();
        let slices = addon(5, dec!(0.50), None, 3);
        let mut ledger = AddonLedger::new();
        ledger.add(&slices, &table, Rounding::CENT);

        let entry = ledger.get(slices.id).unwrap();
        assert_eq!(entry.addon_count, 3);
        assert_eq!(entry.total_without, dec!(1.50));

        let zero_step = addon(6, dec!(1), None, 0);
        ledger.add(&zero_step, &table, Rounding::CENT);
        assert_eq!(ledger.get(zero_step.id).unwrap().addon_count, 1);
    }

    #[test]
    fn test_exclusive_tax_unit_values() {
        let table = taxes();
        let sauce = addon(5, dec!(2.05), Some(1), 1);
        let mut ledger = AddonLedger::new();
        ledger.add(&sauce, &table, Rounding::CENT);

        let entry = ledger.get(sauce.id).unwrap();
        assert_eq!(entry.addon_price_with, dec!(2.26));
        assert_eq!(entry.addon_price_without_including, dec!(2.05));
        assert_eq!(entry.tax, Some(TaxId::new(1)));
    }

    #[test]
    fn test_inclusive_tax_unit_values() {
        let table = taxes();
        let sauce = addon(5, dec!(2.20), Some(2), 1);
        let mut ledger = AddonLedger::new();
        ledger.add(&sauce, &table, Rounding::CENT);
        ledger.add(&sauce, &table, Rounding::CENT);

        let entry = ledger.get(sauce.id).unwrap();
        assert_eq!(entry.addon_price_with, dec!(2.20));
        assert_eq!(entry.addon_price_without_including, dec!(2.00));
        assert_eq!(entry.total_without_including, dec!(4.00));
        assert_eq!(entry.total_with, dec!(4.40));
    }

    #[test]
    fn test_unknown_first_tax_means_untaxed() {
        let table = taxes();
        let odd = addon(5, dec!(1.00), Some(77), 1);
        let mut ledger = AddonLedger::new();
        ledger.add(&odd, &table, Rounding::CENT);

        let entry = ledger.get(odd.id).unwrap();
        assert_eq!(entry.tax, None);
        assert_eq!(entry.addon_price_with, dec!(1.00));
    }

    #[test]
    fn test_remove_decrements_then_deletes() {
        let table = taxes();
        let cheese = addon(5, dec!(3.00), None, 1);
        let mut ledger = AddonLedger::new();
        ledger.add(&cheese, &table, Rounding::CENT);
        ledger.add(&cheese, &table, Rounding::CENT);

        assert_eq!(
            ledger.remove(cheese.id),
            AddonChange::Decremented {
                addon_id: cheese.id,
                count: 1
            }
        );
        assert_eq!(ledger.get(cheese.id).unwrap().total_without, dec!(3.00));

        assert_eq!(
            ledger.remove(cheese.id),
            AddonChange::Removed { addon_id: cheese.id }
        );
        assert!(ledger.is_empty());

        assert_eq!(
            ledger.remove(cheese.id),
            AddonChange::NotPresent { addon_id: cheese.id }
        );
    }

    #[test]
    fn test_entries_keep_selection_order() {
        let table = taxes();
        let mut ledger = AddonLedger::new();
        for id in [9, 3, 6] {
            ledger.add(&addon(id, dec!(1), None, 1), &table, Rounding::CENT);
        }
        ledger.remove(ProductId::new(3));

        let ids: Vec<_> = ledger.entries().iter().map(|e| e.addon_id.get()).collect();
        assert_eq!(ids, vec![9, 6]);
    }

    #[test]
    fn test_merge_sums_counts() {
        let table = taxes();
        let cheese = addon(5, dec!(3.00), Some(1), 1);
        let bacon = addon(6, dec!(2.00), None, 1);

        let mut left = AddonLedger::new();
        left.add(&cheese, &table, Rounding::CENT);

        let mut right = AddonLedger::new();
        right.add(&bacon, &table, Rounding::CENT);
        right.add(&cheese, &table, Rounding::CENT);
        right.add(&cheese, &table, Rounding::CENT);

        let changes = left.merge(&right);
        assert_eq!(changes.len(), 2);

        let merged = left.get(cheese.id).unwrap();
        assert_eq!(merged.addon_count, 3);
        assert_eq!(merged.total_with, dec!(9.90));
        assert_eq!(left.entries()[1].addon_id, bacon.id);
        assert_eq!(left.total_without(), dec!(11.00));
    }

    #[test]
    fn test_from_entries_validates() {
        let table = taxes();
        let mut ledger = AddonLedger::new();
        ledger.add(&addon(5, dec!(3.00), None, 1), &table, Rounding::CENT);

        let mut entries = ledger.entries().to_vec();
        assert_eq!(AddonLedger::from_entries(entries.clone()).unwrap(), ledger);

        entries.push(entries[0].clone());
        assert!(AddonLedger::from_entries(entries.clone()).is_err());

        entries.truncate(1);
        entries[0].addon_price_with = rust_decimal::Decimal::MAX;
        assert!(AddonLedger::from_entries(entries.clone()).is_err());

        entries[0].addon_price_with = dec!(3.00);
        entries[0].addon_count = 0;
        assert!(AddonLedger::from_entries(entries).is_err());
    }
}
