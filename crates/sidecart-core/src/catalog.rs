//! # Catalog
//!
//! Lookup traits the pricing engine needs from its host, plus [`PosCatalog`],
//! an in-memory implementation loaded from a TOML or JSON document.
//!
//! ## Document Shape
//! ```toml
//! [[taxes]]
//! id = 1
//! name = "VAT 10%"
//! amount = "10"
//!
//! [[products]]
//! id = 1
//! display_name = "Burger"
//! lst_price = "10.00"
//! taxes_id = [1]
//! is_addon_include = true
//! addon_ids = [2]
//!
//! [[fiscal_positions]]
//! id = 1
//! name = "Takeaway"
//! tax_mappings = [{ tax_src_id = 1, tax_dest_id = 2 }]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{CoreResult, ValidationError};
use crate::types::{FiscalPosition, FiscalPositionId, Product, ProductId, Tax, TaxId};
use crate::validation::{validate_name, validate_price, validate_tax_percentage};

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Product lookup by id.
pub trait ProductCatalog {
    fn product(&self, id: ProductId) -> Option<&Product>;
}

/// The ordered tax table.
pub trait TaxTable {
    fn tax(&self, id: TaxId) -> Option<&Tax>;

    /// All taxes in table order (ascending `sequence`, then id).
    fn taxes(&self) -> Vec<&Tax>;
}

/// Fiscal position lookup by id.
pub trait FiscalPositions {
    fn fiscal_position(&self, id: FiscalPositionId) -> Option<&FiscalPosition>;
}

// =============================================================================
// PosCatalog
// =============================================================================

/// Serialized catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub taxes: Vec<Tax>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub fiscal_positions: Vec<FiscalPosition>,
}

/// In-memory catalog backing all three collaborator traits.
#[derive(Debug, Clone, Default)]
pub struct PosCatalog {
    taxes: BTreeMap<TaxId, Tax>,
    products: BTreeMap<ProductId, Product>,
    fiscal_positions: BTreeMap<FiscalPositionId, FiscalPosition>,
}

impl PosCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a parsed document, validating every entry.
    pub fn from_document(doc: CatalogDocument) -> CoreResult<Self> {
        let mut catalog = PosCatalog::new();
        for tax in doc.taxes {
            catalog.add_tax(tax)?;
        }
        for product in doc.products {
            catalog.add_product(product)?;
        }
        for fp in doc.fiscal_positions {
            catalog.add_fiscal_position(fp)?;
        }
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let doc: CatalogDocument = toml::from_str(content)?;
        Self::from_document(doc)
    }

    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        let doc: CatalogDocument = serde_json::from_str(content)?;
        Self::from_document(doc)
    }

    /// Loads a catalog file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let catalog = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        info!(
            path = %path.display(),
            taxes = catalog.taxes.len(),
            products = catalog.products.len(),
            fiscal_positions = catalog.fiscal_positions.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Returns the catalog as a serializable document.
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            taxes: self.taxes.values().cloned().collect(),
            products: self.products.values().cloned().collect(),
            fiscal_positions: self.fiscal_positions.values().cloned().collect(),
        }
    }

    pub fn add_tax(&mut self, tax: Tax) -> CoreResult<()> {
        validate_name("tax name", &tax.name)?;
        validate_tax_percentage(tax.amount)?;
        if self.taxes.contains_key(&tax.id) {
            return Err(duplicate("tax id", tax.id).into());
        }
        debug!(tax_id = %tax.id, name = %tax.name, "Registered tax");
        self.taxes.insert(tax.id, tax);
        Ok(())
    }

    pub fn add_product(&mut self, product: Product) -> CoreResult<()> {
        validate_name("display_name", &product.display_name)?;
        validate_price(product.lst_price)?;
        if self.products.contains_key(&product.id) {
            return Err(duplicate("product id", product.id).into());
        }
        self.products.insert(product.id, product);
        Ok(())
    }

    pub fn add_fiscal_position(&mut self, fp: FiscalPosition) -> CoreResult<()> {
        validate_name("fiscal position name", &fp.name)?;
        if self.fiscal_positions.contains_key(&fp.id) {
            return Err(duplicate("fiscal position id", fp.id).into());
        }
        self.fiscal_positions.insert(fp.id, fp);
        Ok(())
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

fn duplicate(field: &str, value: impl ToString) -> ValidationError {
    ValidationError::Duplicate {
        field: field.to_string(),
        value: value.to_string(),
    }
}

impl ProductCatalog for PosCatalog {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }
}

impl TaxTable for PosCatalog {
    fn tax(&self, id: TaxId) -> Option<&Tax> {
        self.taxes.get(&id)
    }

    fn taxes(&self) -> Vec<&Tax> {
        let mut taxes: Vec<&Tax> = self.taxes.values().collect();
        taxes.sort_by_key(|t| t.sequence);
        taxes
    }
}

impl FiscalPositions for PosCatalog {
    fn fiscal_position(&self, id: FiscalPositionId) -> Option<&FiscalPosition> {
        self.fiscal_positions.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use rust_decimal_macros::dec;

    const CATALOG_TOML: &str = r#"
        [[taxes]]
        id = 2
        name = "Eco fee"
        amount = "2"
        sequence = 5

        [[taxes]]
        id = 1
        name = "VAT 10%"
        amount = "10"
        sequence = 1
        include_base_amount = true

        [[products]]
        id = 1
        display_name = "Burger"
        lst_price = "10.00"
        taxes_id = [1]
        is_addon_include = true
        addon_ids = [2]

        [[products]]
        id = 2
        display_name = "Extra cheese"
        lst_price = "1.50"
        uom = { name = "Slices", default_step = 2 }

        [[fiscal_positions]]
        id = 7
        name = "Takeaway"
        tax_mappings = [{ tax_src_id = 1, tax_dest_id = 2 }]
    "#;

    #[test]
    fn test_load_from_toml() {
        let catalog = PosCatalog::from_toml_str(CATALOG_TOML).unwrap();

        let burger = catalog.product(ProductId::new(1)).unwrap();
        assert_eq!(burger.lst_price, dec!(10.00));
        assert!(burger.offers_addon(ProductId::new(2)));

        let cheese = catalog.product(ProductId::new(2)).unwrap();
        assert_eq!(cheese.uom.default_step, 2);

        assert!(catalog.tax(TaxId::new(1)).unwrap().include_base_amount);
        assert!(catalog.fiscal_position(FiscalPositionId::new(7)).is_some());
    }

    #[test]
    fn test_taxes_in_sequence_order() {
        let catalog = PosCatalog::from_toml_str(CATALOG_TOML).unwrap();
        let ids: Vec<_> = catalog.taxes().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaxId::new(1), TaxId::new(2)]);
    }

    #[test]
    fn test_json_document_roundtrip() {
        let catalog = PosCatalog::from_toml_str(CATALOG_TOML).unwrap();
        let json = serde_json::to_string(&catalog.to_document()).unwrap();
        let reloaded = PosCatalog::from_json_str(&json).unwrap();
        assert_eq!(
            reloaded.product(ProductId::new(2)),
            catalog.product(ProductId::new(2))
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let doc = r#"
            [[taxes]]
            id = 1
            name = "A"
            amount = "5"

            [[taxes]]
            id = 1
            name = "B"
            amount = "7"
        "#;
        let err = PosCatalog::from_toml_str(doc).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_entries() {
        let bad_tax = r#"
            [[taxes]]
            id = 1
            name = "Too much"
            amount = "150"
        "#;
        assert!(PosCatalog::from_toml_str(bad_tax).is_err());

        let unnamed = r#"
            [[products]]
            id = 1
            display_name = " "
            lst_price = "1"
        "#;
        assert!(PosCatalog::from_toml_str(unnamed).is_err());
    }

    #[test]
    fn test_rejects_price_above_maximum() {
        let mut catalog = PosCatalog::new();
        let product = Product {
            id: ProductId::new(99),
            display_name: "Gold bar".to_string(),
            lst_price: rust_decimal::Decimal::MAX,
            taxes_id: vec![],
            uom: Default::default(),
            is_addon_include: false,
            addon_ids: vec![],
            description: None,
        };

        assert!(matches!(
            catalog.add_product(product.clone()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(catalog
            .add_product(Product {
                lst_price: crate::MAX_UNIT_PRICE,
                ..product
            })
            .is_ok());
    }

    #[test]
    fn test_unknown_lookups_are_none() {
        let catalog = PosCatalog::new();
        assert!(catalog.product(ProductId::new(1)).is_none());
        assert!(catalog.tax(TaxId::new(1)).is_none());
        assert!(catalog.taxes().is_empty());
    }
}
