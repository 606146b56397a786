pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use libris_db::{Book, Catalog, Repository};
use libris_http::resource::{self, collection_path};
use libris_kernel::{InitCtx, Module};
use serde_json::json;

use models::BookResource;

/// Books resource: `/v1/books`
pub struct BooksModule {
    resource: Arc<BookResource>,
    catalog: Arc<Catalog>,
}

impl BooksModule {
    pub fn new(catalog: Arc<Catalog>, reject_future_dates: bool) -> Self {
        Self {
            resource: Arc::new(BookResource::new(reject_future_dates)),
            catalog,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            reject_future_dates = ctx.settings.catalog.reject_future_dates,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let repository: Arc<dyn Repository<Book>> = self.catalog.clone();

        Router::new()
            .route(
                &format!("{}/health", collection_path(self.name())),
                get(health_check),
            )
            .merge(resource::routes(self.resource.clone(), repository))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut fragment = resource::openapi_fragment(self.resource.as_ref());
        fragment["paths"][format!("{}/health", collection_path(self.name()))] = json!({
            "get": {
                "summary": "Books health check",
                "tags": [self.name()],
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": {"text/plain": {"schema": {"type": "string"}}}
                    }
                }
            }
        });
        Some(fragment)
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Create a new instance of the books module
pub fn create_module(catalog: Arc<Catalog>, reject_future_dates: bool) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(catalog, reject_future_dates))
}
