//! Shared catalog fixture for integration tests.

#![allow(dead_code)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sidecart_core::{
    OrderLine, PosCatalog, Product, ProductCatalog, ProductId, Rounding, Tax, TaxId, UnitOfMeasure,
};

pub const VAT: TaxId = TaxId::new(1);
pub const VAT_INCL: TaxId = TaxId::new(2);
pub const ECO: TaxId = TaxId::new(3);

pub const BURGER: ProductId = ProductId::new(1);
pub const COLA: ProductId = ProductId::new(2);
pub const FRIES: ProductId = ProductId::new(3);
pub const CHEESE: ProductId = ProductId::new(10);
pub const BACON: ProductId = ProductId::new(11);
pub const SAUCE: ProductId = ProductId::new(12);

pub fn tax(id: TaxId, amount: Decimal, include_base_amount: bool, sequence: u32) -> Tax {
    Tax {
        id,
        name: format!("Tax {}", id),
        amount,
        include_base_amount,
        sequence,
    }
}

pub fn product(id: ProductId, price: Decimal, taxes: &[TaxId], addons: &[ProductId]) -> Product {
    Product {
        id,
        display_name: format!("Product {}", id),
        lst_price: price,
        taxes_id: taxes.to_vec(),
        uom: UnitOfMeasure::default(),
        is_addon_include: !addons.is_empty(),
        addon_ids: addons.to_vec(),
        description: None,
    }
}

/// Burger (10.00, VAT) with three add-ons:
/// cheese 3.00 untaxed, bacon 2.00 VAT, sauce 2.20 VAT included.
pub fn catalog() -> PosCatalog {
    let mut c = PosCatalog::new();
    c.add_tax(tax(VAT, dec!(10), false, 1)).unwrap();
    c.add_tax(tax(VAT_INCL, dec!(10), true, 2)).unwrap();
    c.add_tax(tax(ECO, dec!(2), false, 3)).unwrap();

    c.add_product(product(BURGER, dec!(10.00), &[VAT], &[CHEESE, BACON, SAUCE]))
        .unwrap();
    c.add_product(product(COLA, dec!(2.50), &[VAT], &[])).unwrap();
    c.add_product(product(FRIES, dec!(3.10), &[VAT_INCL, ECO], &[])).unwrap();
    c.add_product(product(CHEESE, dec!(3.00), &[], &[])).unwrap();
    c.add_product(product(BACON, dec!(2.00), &[VAT], &[])).unwrap();
    c.add_product(product(SAUCE, dec!(2.20), &[VAT_INCL], &[])).unwrap();
    c
}

pub fn line(c: &PosCatalog, id: ProductId, qty: Decimal) -> OrderLine {
    OrderLine::new(c.product(id).unwrap().clone(), qty).unwrap()
}

pub fn with_addons(c: &PosCatalog, mut line: OrderLine, addons: &[ProductId]) -> OrderLine {
    for &addon in addons {
        line.select_addon(addon, c, Rounding::CENT);
    }
    line
}
