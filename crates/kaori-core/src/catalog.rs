//! # Catalog Snapshot
//!
//! An immutable view of the menu that pricing reads from.
//!
//! The catalog itself is owned elsewhere (admin CRUD, seeding); the order
//! pipeline only ever sees a snapshot, so a price edit made while an order is
//! being priced cannot produce a half-old, half-new total.

use serde::{Deserialize, Serialize};

use crate::types::{Product, Table};

/// Read-only menu and table list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
    tables: Vec<Table>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, tables: Vec<Table>) -> Self {
        Self { products, tables }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    /// Flags a product as available or sold out.
    ///
    /// Returns false if the product does not exist.
    pub fn set_availability(&mut self, product_id: &str, is_available: bool) -> bool {
        match self.products.iter_mut().find(|p| p.id == product_id) {
            Some(product) => {
                product.is_available = is_available;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(
            vec![Product {
                id: "prod-7".to_string(),
                category_id: "cat-3".to_string(),
                name: "Croissant".to_string(),
                description: "Buttery French pastry".to_string(),
                base_price: 25_000,
                is_available: true,
                variants: vec![],
                modifiers: vec![],
            }],
            vec![Table {
                id: "table-2".to_string(),
                number: 2,
                capacity: 4,
                qr_code: "QR002".to_string(),
            }],
        )
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.product("prod-7").map(|p| p.base_price), Some(25_000));
        assert!(catalog.product("prod-99").is_none());
        assert_eq!(catalog.table("table-2").map(|t| t.number), Some(2));
    }

    #[test]
    fn test_set_availability() {
        let mut catalog = catalog();
        assert!(catalog.set_availability("prod-7", false));
        assert_eq!(catalog.product("prod-7").map(|p| p.is_available), Some(false));
        assert!(!catalog.set_availability("prod-99", false));
    }
}
