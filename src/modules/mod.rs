pub mod books;
pub mod categories;

use std::sync::Arc;

use libris_db::Catalog;
use libris_kernel::{settings::Settings, ModuleRegistry};

/// Register the catalog modules, all sharing one store handle
pub fn register_all(
    registry: &mut ModuleRegistry,
    catalog: &Arc<Catalog>,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(categories::create_module(catalog.clone()))?;
    registry.register(books::create_module(
        catalog.clone(),
        settings.catalog.reject_future_dates,
    ))?;
    Ok(())
}
