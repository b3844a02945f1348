//! # Merge Policy
//!
//! Decides whether a newly rung-up line may be folded into an existing one
//! (two plain coffees become one line of quantity 2).
//!
//! A line whose product offers add-ons never merges: its identity is the
//! particular add-on selection, which a quantity bump would lose.

use crate::order_line::OrderLine;

/// Line merge rule.
pub struct MergePolicy;

impl MergePolicy {
    /// Returns true if `b` can be folded into `a`.
    pub fn can_merge(a: &OrderLine, b: &OrderLine) -> bool {
        if a.product().is_addon_include || b.product().is_addon_include {
            return false;
        }
        Self::baseline_equal(a, b)
    }

    /// Same product, unit price, discount and tax override.
    fn baseline_equal(a: &OrderLine, b: &OrderLine) -> bool {
        a.product().id == b.product().id
            && a.price_unit() == b.price_unit()
            && a.discount() == b.discount()
            && a.tax_override() == b.tax_override()
    }
}
