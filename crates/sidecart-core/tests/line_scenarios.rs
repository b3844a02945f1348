//! End-to-end line scenarios: catalog → line → add-ons → prices → export.

mod common;

use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sidecart_core::order_line::OrderLineJson;
use sidecart_core::{
    DiscountScope, LedgerState, MergePolicy, Order, OrderLine, PosCatalog, PriceCalculator,
    PricingConfig, PricingStrategy, TaxMode,
};

#[test]
fn untaxed_addon_added_twice_on_taxed_product() {
    let c = catalog();
    let l = with_addons(&c, line(&c, BURGER, dec!(2)), &[CHEESE, CHEESE]);
    let calc = PriceCalculator::new(&c);

    assert_eq!(l.addon_items().get(CHEESE).unwrap().addon_count, 2);
    assert_eq!(calc.base_price(&l), dec!(26.00));
    // 20.00 × 1.10 + 6.00
    assert_eq!(calc.price_with_tax(&l), dec!(28.00));
}

/// Both discount rules on one fixture: 10.00 × 2 at 25 % with 6.00 of
/// untaxed add-ons.
#[test]
fn discount_scope_fixture() {
    let c = catalog();
    let mut l = with_addons(&c, line(&c, BURGER, dec!(2)), &[CHEESE, CHEESE]);
    l.set_discount(dec!(25)).unwrap();

    let product_only = PriceCalculator::new(&c);
    assert_eq!(product_only.base_price(&l), dec!(21.00));
    assert_eq!(product_only.price_with_tax(&l), dec!(22.50));

    let whole_line = PriceCalculator::new(&c).with_discount_scope(DiscountScope::WholeLine);
    assert_eq!(whole_line.base_price(&l), dec!(19.50));
    assert_eq!(whole_line.price_with_tax(&l), dec!(21.00));

    for prices in [product_only.all_prices(&l), whole_line.all_prices(&l)] {
        assert_eq!(prices.price_with_tax - prices.price_without_tax, prices.tax);
        assert_eq!(prices.tax_details.values().copied().sum::<Decimal>(), prices.tax);
        assert_eq!(prices.price_with_tax_before_discount, dec!(28.00));
    }
}

#[test]
fn mixed_addon_taxes_reconcile() {
    let c = catalog();
    let mut l = with_addons(&c, line(&c, BURGER, dec!(1)), &[BACON, SAUCE, SAUCE, CHEESE]);
    l.set_discount(dec!(10)).unwrap();
    let prices = PriceCalculator::new(&c).all_prices(&l);

    // product 9.00 + 0.90; bacon 2.00 + 0.20; sauce 2 × 2.20 incl. (0.40); cheese 3.00
    assert_eq!(prices.tax_details[&VAT], dec!(1.10));
    assert_eq!(prices.tax_details[&VAT_INCL], dec!(0.40));
    assert_eq!(prices.tax, dec!(1.50));
    assert_eq!(prices.price_without_tax, dec!(18.00));
    assert_eq!(prices.price_with_tax, dec!(19.50));
    assert_eq!(prices.discount_tax_effect[&VAT], dec!(0.10));
}

#[test]
fn cascading_product_taxes() {
    let c = catalog();
    let l = line(&c, FRIES, dec!(1));
    let prices = PriceCalculator::new(&c).all_prices(&l);

    // 3.10 → 10 % = 0.31 (cascades) → 2 % of 3.41 = 0.0682 → 0.07
    assert_eq!(prices.tax_details[&VAT_INCL], dec!(0.31));
    assert_eq!(prices.tax_details[&ECO], dec!(0.07));
    assert_eq!(prices.price_with_tax, dec!(3.48));
}

#[test]
fn display_price_per_mode() {
    let c = catalog();
    let l = with_addons(&c, line(&c, BURGER, dec!(1)), &[BACON]);

    let config = PricingConfig {
        tax_mode: TaxMode::Inclusive,
        ..PricingConfig::default()
    };
    assert_eq!(PriceCalculator::from_config(&c, &config).display_price(&l), dec!(13.20));
    assert_eq!(PriceCalculator::new(&c).display_price(&l), dec!(12.00));
}

#[test]
fn ineligible_addons_leave_ledger_untouched() {
    let c = catalog();
    let mut l = line(&c, COLA, dec!(1));
    assert!(l.select_addon(CHEESE, &c, Default::default()).is_none());
    assert_eq!(l.addon_items().state(), LedgerState::Empty);
}

#[test]
fn merge_examples() {
    let c = catalog();

    let p1 = line(&c, BURGER, dec!(1));
    let p2 = line(&c, BURGER, dec!(1));
    assert!(!MergePolicy::can_merge(&p1, &p2));

    let q1 = line(&c, COLA, dec!(1));
    let q2 = line(&c, COLA, dec!(1));
    assert!(MergePolicy::can_merge(&q1, &q2));

    let mut order = Order::new();
    order.add_line(p1);
    order.add_line(p2);
    order.add_line(q1);
    order.add_line(q2);
    assert_eq!(order.lines().len(), 3);
    assert_eq!(order.lines()[2].quantity(), dec!(2));
}

#[test]
fn exported_addon_items_use_wire_names() {
    let c = catalog();
    let l = with_addons(&c, line(&c, BURGER, dec!(1)), &[SAUCE]);
    let value = serde_json::to_value(l.export_as_json()).unwrap();

    let item = &value["addon_items"][0];
    for key in [
        "addon_id",
        "addon_name",
        "addon_price_without",
        "addon_price_with",
        "addon_price_without_including",
        "addon_uom",
        "addon_count",
        "total_without",
        "total_without_including",
        "total_with",
        "tax",
    ] {
        assert!(item.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(item["addon_price_without_including"], "2.00");
    assert_eq!(item["tax"], 2);
}

#[test]
fn export_import_export_is_stable() {
    let c = catalog();
    let mut l = with_addons(&c, line(&c, BURGER, dec!(3)), &[SAUCE, CHEESE, SAUCE, BACON]);
    l.deselect_addon(CHEESE);
    l.set_discount(dec!(5)).unwrap();

    let first = serde_json::to_string(&l.export_as_json()).unwrap();
    let parsed: OrderLineJson = serde_json::from_str(&first).unwrap();
    let second = serde_json::to_string(&OrderLine::from_json(&parsed, &c).unwrap().export_as_json())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn order_totals_count_addons_net_of_inclusive_tax() {
    let c: PosCatalog = catalog();
    let mut order = Order::new();
    order.add_line(with_addons(&c, line(&c, BURGER, dec!(1)), &[SAUCE]));
    order.add_line(line(&c, COLA, dec!(2)));

    let calc = order.price_calculator(&c, &PricingConfig::default());
    // burger 10.00, sauce 2.00 net, cola 5.00
    assert_eq!(order.total_without_tax(&calc), dec!(17.00));
    assert_eq!(order.total_with_tax(&calc), dec!(18.70));

    let rows = order.persisted_lines(&calc);
    assert_eq!(rows.iter().filter(|r| r.is_addon).count(), 1);
    let flat: Decimal = rows.iter().map(|r| r.price_subtotal).sum();
    assert_eq!(flat, order.total_without_tax(&calc));
}
