//! Nominal tax ids → effective taxes.

use std::collections::HashSet;
use tracing::debug;

use crate::catalog::TaxTable;
use crate::types::{FiscalPosition, Tax, TaxId};

/// Maps a line's nominal taxes through an optional fiscal position.
///
/// ## Rules
/// - Unknown tax ids are dropped.
/// - Without a fiscal position the known taxes are returned as-is.
/// - With one, every mapping row whose source is the tax contributes its
///   destination; a tax with no row maps to itself. Rows without a known
///   destination contribute nothing, which is how a tax gets removed.
/// - The result holds each tax once, in first-produced order.
pub struct TaxResolver<'a, T: TaxTable + ?Sized> {
    table: &'a T,
    fiscal_position: Option<&'a FiscalPosition>,
}

impl<'a, T: TaxTable + ?Sized> TaxResolver<'a, T> {
    pub fn new(table: &'a T, fiscal_position: Option<&'a FiscalPosition>) -> Self {
        TaxResolver {
            table,
            fiscal_position,
        }
    }

    pub fn resolve(&self, tax_ids: &[TaxId]) -> Vec<Tax> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for &id in tax_ids {
            let Some(tax) = self.table.tax(id) else {
                debug!(tax_id = %id, "Dropping unknown tax");
                continue;
            };

            for mapped in self.map_tax(tax) {
                if seen.insert(mapped.id) {
                    resolved.push(mapped.clone());
                }
            }
        }

        resolved
    }

    fn map_tax(&self, tax: &'a Tax) -> Vec<&'a Tax> {
        let Some(fp) = self.fiscal_position else {
            return vec![tax];
        };

        let mut rows = fp.mappings_for(tax.id).peekable();
        if rows.peek().is_none() {
            return vec![tax];
        }

        rows.filter_map(|row| row.tax_dest_id)
            .filter_map(|dest| self.table.tax(dest))
            .collect()
    }
}
