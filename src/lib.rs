//! Libris application library
//!
//! Wires the catalog store, the books/categories modules and the HTTP layer
//! together. The store handle and the module registry are built once here and
//! handed down explicitly.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use libris_db::Catalog;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub struct App {
    settings: Settings,
    catalog: Arc<Catalog>,
    registry: ModuleRegistry,
}

impl App {
    /// Open the configured store and register every module.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let catalog = Catalog::open(settings.storage.snapshot_path.clone())
            .await
            .context("failed to open catalog store")?;
        Self::with_catalog(settings, Arc::new(catalog))
    }

    /// Build the application around an existing store.
    pub fn with_catalog(settings: Settings, catalog: Arc<Catalog>) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &catalog, &settings)?;

        Ok(Self {
            settings,
            catalog,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The full HTTP surface, middlewares included.
    pub fn router(&self) -> Router {
        libris_http::build_router(&self.registry, &self.settings)
    }

    /// Run module lifecycle around the HTTP server until shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_all(&ctx).await?;
        self.registry.start_all(&ctx).await?;

        let served = libris_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_all().await?;
        served
    }
}
