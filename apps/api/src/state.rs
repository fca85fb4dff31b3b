//! Shared application state handed to every handler.

use std::sync::Arc;

use kaori_core::Catalog;
use kaori_orders::{CatalogReader, InMemoryCatalog, OrderLifecycle, OrderStore};
use kaori_realtime::{BroadcastHub, HubHandle};

use crate::auth::{JwtManager, StaffDirectory};
use crate::config::KaoriConfig;
use crate::seed;

/// Cheap to clone; everything sits behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: KaoriConfig,
    lifecycle: OrderLifecycle,
    catalog: Arc<InMemoryCatalog>,
    hub: HubHandle,
    staff: StaffDirectory,
    jwt: JwtManager,
}

impl AppState {
    /// Wires the order store, catalog and hub together.
    pub fn new(config: KaoriConfig, hub: HubHandle, catalog: Catalog, staff: StaffDirectory) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new(catalog));
        let lifecycle = OrderLifecycle::new(
            Arc::new(OrderStore::new()),
            catalog.clone(),
            Arc::new(hub.clone()),
            config.lifecycle,
        );
        let jwt = JwtManager::new(
            config.auth.jwt_secret.clone(),
            config.auth.access_lifetime_hours,
        );

        AppState {
            inner: Arc::new(Inner {
                config,
                lifecycle,
                catalog,
                hub,
                staff,
                jwt,
            }),
        }
    }

    /// Starts the hub on the current runtime and loads the seed data.
    pub fn bootstrap(config: KaoriConfig) -> anyhow::Result<Self> {
        let hub = BroadcastHub::new(config.hub.clone())?.start();
        let staff = seed::seed_staff()?;
        Ok(Self::new(config, hub, seed::seed_catalog(), staff))
    }

    pub fn config(&self) -> &KaoriConfig {
        &self.inner.config
    }

    pub fn lifecycle(&self) -> &OrderLifecycle {
        &self.inner.lifecycle
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.inner.catalog.snapshot()
    }

    /// Marks a product sold out or back in stock. False if unknown.
    pub fn set_product_availability(&self, product_id: &str, is_available: bool) -> bool {
        self.inner.catalog.set_availability(product_id, is_available)
    }

    pub fn hub(&self) -> &HubHandle {
        &self.inner.hub
    }

    pub fn staff(&self) -> &StaffDirectory {
        &self.inner.staff
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.inner.jwt
    }

    pub fn default_store_id(&self) -> &str {
        &self.inner.config.server.default_store_id
    }
}
