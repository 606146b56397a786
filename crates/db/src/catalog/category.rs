use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Catalog, Tables};
use crate::entity::{Category, Entity, NewCategory, Repository};
use crate::error::{DbError, DbResult};
use crate::table::check_text;
use crate::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryRow {
    name: String,
}

impl Tables {
    fn category(&self, id: RecordId) -> DbResult<Category> {
        let row = self
            .categories
            .get(id)
            .ok_or_else(|| DbError::not_found(Category::TABLE, id))?;
        Ok(Category {
            id,
            name: row.name.clone(),
        })
    }
}

fn check(draft: &NewCategory) -> DbResult<()> {
    check_text(Category::TABLE, "name", &draft.name, Category::NAME_MAX_CHARS)
}

#[async_trait]
impl Repository<Category> for Catalog {
    async fn list(&self) -> DbResult<Vec<Category>> {
        let tables = self.read().await;
        Ok(tables
            .categories
            .iter()
            .map(|(id, row)| Category {
                id,
                name: row.name.clone(),
            })
            .collect())
    }

    async fn create(&self, draft: NewCategory) -> DbResult<Category> {
        check(&draft)?;
        let category = self
            .mutate(move |tables| {
                let id = tables.categories.insert(CategoryRow {
                    name: draft.name.clone(),
                });
                Ok(Category {
                    id,
                    name: draft.name,
                })
            })
            .await?;

        tracing::debug!(table = Category::TABLE, id = category.id, "record created");
        Ok(category)
    }

    async fn get(&self, id: RecordId) -> DbResult<Category> {
        self.read().await.category(id)
    }

    async fn update(&self, id: RecordId, draft: NewCategory) -> DbResult<Category> {
        self.mutate(move |tables| {
            if !tables.categories.contains(id) {
                return Err(DbError::not_found(Category::TABLE, id));
            }
            check(&draft)?;
            tables.categories.replace(id, CategoryRow { name: draft.name });
            tables.category(id)
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> DbResult<()> {
        let unlinked = self
            .mutate(move |tables| {
                tables
                    .categories
                    .remove(id)
                    .ok_or_else(|| DbError::not_found(Category::TABLE, id))?;
                Ok(tables.book_categories.unlink_right(id))
            })
            .await?;

        tracing::info!(
            table = Category::TABLE,
            id,
            unlinked_books = unlinked,
            "category deleted"
        );
        Ok(())
    }
}
