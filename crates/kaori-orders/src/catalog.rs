//! In-memory menu holder.
//!
//! Writers swap in a new `Arc<Catalog>`; readers keep whatever snapshot they
//! already grabbed, so a pricing call never observes a half-applied edit.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use kaori_core::Catalog;

use crate::repository::CatalogReader;

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    current: RwLock<Arc<Catalog>>,
}

impl InMemoryCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Replaces the whole menu.
    pub fn replace(&self, catalog: Catalog) {
        info!(products = catalog.products().len(), "Catalog replaced");
        *self.current.write() = Arc::new(catalog);
    }

    /// Marks a product sold out (or back in stock).
    ///
    /// Returns false if the product is unknown.
    pub fn set_availability(&self, product_id: &str, is_available: bool) -> bool {
        let mut current = self.current.write();
        let mut next = Catalog::clone(&**current);
        if !next.set_availability(product_id, is_available) {
            return false;
        }
        *current = Arc::new(next);
        info!(product_id = %product_id, is_available, "Product availability changed");
        true
    }
}

impl CatalogReader for InMemoryCatalog {
    fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }
}
