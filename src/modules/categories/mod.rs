pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use libris_db::{Catalog, Category, Repository};
use libris_http::resource::{self, collection_path};
use libris_kernel::{InitCtx, Module};

use models::CategoryResource;

/// Categories resource: `/v1/categories`
pub struct CategoriesModule {
    resource: Arc<CategoryResource>,
    catalog: Arc<Catalog>,
}

impl CategoriesModule {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            resource: Arc::new(CategoryResource::new()),
            catalog,
        }
    }
}

#[async_trait]
impl Module for CategoriesModule {
    fn name(&self) -> &'static str {
        "categories"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "categories module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let repository: Arc<dyn Repository<Category>> = self.catalog.clone();

        Router::new()
            .route(
                &format!("{}/health", collection_path(self.name())),
                get(|| async { "categories module is healthy" }),
            )
            .merge(resource::routes(self.resource.clone(), repository))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(resource::openapi_fragment(self.resource.as_ref()))
    }
}

pub fn create_module(catalog: Arc<Catalog>) -> Arc<dyn Module> {
    Arc::new(CategoriesModule::new(catalog))
}
