//! The catalog store: categories, books and the `book_categories` link table
//! behind a single lock.
//!
//! Every mutation runs against a staged copy of the tables and is committed
//! only when all constraints hold (and the snapshot, if any, is written). A
//! rejected write therefore leaves nothing behind.
//!
//! Staging clones every table, so a write costs time proportional to the
//! whole catalog. That is fine for a library-sized catalog; a much larger one
//! would want per-row undo records instead.

mod book;
mod category;

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::error::{DbError, DbResult};
use crate::table::{LinkTable, Table};

pub(crate) use book::BookRow;
pub(crate) use category::CategoryRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Tables {
    pub(crate) categories: Table<CategoryRow>,
    pub(crate) books: Table<BookRow>,
    /// `(book_id, category_id)` pairs.
    pub(crate) book_categories: LinkTable,
}

impl Tables {
    fn new() -> Self {
        Self {
            categories: Table::new("category"),
            books: Table::new("book"),
            book_categories: LinkTable::new(),
        }
    }
}

pub struct Catalog {
    tables: RwLock<Tables>,
    snapshot: Option<PathBuf>,
}

impl Catalog {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
            snapshot: None,
        }
    }

    /// Open a store backed by a JSON snapshot, loading it when the file exists.
    /// `None` behaves like [`Catalog::in_memory`].
    pub async fn open(snapshot: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(path) = snapshot else {
            return Ok(Self::in_memory());
        };

        let tables = if tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to probe snapshot {}", path.display()))?
        {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            let tables: Tables = serde_json::from_slice(&bytes)
                .with_context(|| format!("snapshot {} is not valid", path.display()))?;
            tracing::info!(
                path = %path.display(),
                categories = tables.categories.len(),
                books = tables.books.len(),
                "catalog snapshot loaded"
            );
            tables
        } else {
            tracing::info!(path = %path.display(), "no snapshot yet, starting empty");
            Tables::new()
        };

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    /// Apply `change` to a staged copy of the tables and commit it on success.
    pub(crate) async fn mutate<T, F>(&self, change: F) -> DbResult<T>
    where
        F: FnOnce(&mut Tables) -> DbResult<T> + Send,
        T: Send,
    {
        let mut tables = self.tables.write().await;
        let mut staged = tables.clone();
        let outcome = change(&mut staged)?;

        if let Some(path) = &self.snapshot {
            write_snapshot(path, &staged).await?;
        }

        *tables = staged;
        Ok(outcome)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::in_memory()
    }
}

async fn write_snapshot(path: &Path, tables: &Tables) -> DbResult<()> {
    let bytes = serde_json::to_vec_pretty(tables)
        .map_err(|err| DbError::Storage(format!("failed to encode snapshot: {err}")))?;

    let staging = staging_path(path);
    if let Err(err) = tokio::fs::write(&staging, &bytes).await {
        tokio::fs::remove_file(&staging).await.ok();
        return Err(DbError::Storage(format!(
            "failed to write {}: {err}",
            staging.display()
        )));
    }
    if let Err(err) = tokio::fs::rename(&staging, path).await {
        tokio::fs::remove_file(&staging).await.ok();
        return Err(DbError::Storage(format!(
            "failed to replace {}: {err}",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "catalog snapshot written");
    Ok(())
}

/// `catalog.json` stages through `catalog.json.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::macros::date;

    use super::*;
    use crate::{Book, Category, NewBook, NewCategory, Repository};

    fn dune(categories: impl IntoIterator<Item = u64>) -> NewBook {
        NewBook {
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: "9780441013593".into(),
            date_published: date!(1965 - 08 - 01),
            categories: categories.into_iter().collect(),
        }
    }

    async fn category(catalog: &Catalog, name: &str) -> Category {
        Repository::<Category>::create(catalog, NewCategory { name: name.into() })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_catalog_lists_nothing() {
        let catalog = Catalog::in_memory();
        assert!(Repository::<Book>::list(&catalog).await.unwrap().is_empty());
        assert!(Repository::<Category>::list(&catalog).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn book_keeps_category_set_without_duplicates() {
        let catalog = Catalog::in_memory();
        let fiction = category(&catalog, "Fiction").await;
        let classic = category(&catalog, "Classic").await;

        let draft = NewBook {
            categories: BTreeSet::from([classic.id, fiction.id, classic.id]),
            ..dune([])
        };
        let book = Repository::<Book>::create(&catalog, draft).await.unwrap();
        assert_eq!(book.categories, vec![fiction.id, classic.id]);

        let fetched = Repository::<Book>::get(&catalog, book.id).await.unwrap();
        assert_eq!(fetched, book);
    }

    #[tokio::test]
    async fn dangling_category_is_rejected_and_nothing_persists() {
        let catalog = Catalog::in_memory();
        let fiction = category(&catalog, "Fiction").await;

        let err = Repository::<Book>::create(&catalog, dune([fiction.id, 9]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DbError::ForeignKey {
                table: "book",
                field: "categories",
                target: "category",
                id: 9
            }
        );

        let tables = catalog.read().await;
        assert!(tables.books.is_empty());
        assert!(tables.book_categories.is_empty());
    }

    #[tokio::test]
    async fn deleting_category_cascades_to_links_only() {
        let catalog = Catalog::in_memory();
        let fiction = category(&catalog, "Fiction").await;
        let classic = category(&catalog, "Classic").await;
        let first = Repository::<Book>::create(&catalog, dune([fiction.id, classic.id]))
            .await
            .unwrap();
        let second = Repository::<Book>::create(&catalog, dune([fiction.id]))
            .await
            .unwrap();

        Repository::<Category>::delete(&catalog, fiction.id)
            .await
            .unwrap();

        let books = Repository::<Book>::list(&catalog).await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].id, first.id);
        assert_eq!(books[0].categories, vec![classic.id]);
        assert_eq!(books[1].id, second.id);
        assert!(books[1].categories.is_empty());
    }

    #[tokio::test]
    async fn deleted_book_is_gone() {
        let catalog = Catalog::in_memory();
        let fiction = category(&catalog, "Fiction").await;
        let book = Repository::<Book>::create(&catalog, dune([fiction.id]))
            .await
            .unwrap();

        Repository::<Book>::delete(&catalog, book.id).await.unwrap();

        assert_eq!(
            Repository::<Book>::get(&catalog, book.id).await.unwrap_err(),
            DbError::not_found("book", book.id)
        );
        assert_eq!(
            Repository::<Book>::delete(&catalog, book.id).await.unwrap_err(),
            DbError::not_found("book", book.id)
        );
        assert!(catalog.read().await.book_categories.is_empty());
    }

    #[tokio::test]
    async fn update_checks_existence_before_constraints() {
        let catalog = Catalog::in_memory();
        let err = Repository::<Category>::update(&catalog, 7, NewCategory { name: "".into() })
            .await
            .unwrap_err();
        assert_eq!(err, DbError::not_found("category", 7));

        let fiction = category(&catalog, "Fiction").await;
        let err = Repository::<Category>::update(&catalog, fiction.id, NewCategory { name: " ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Constraint { field: "name", .. }));

        let renamed =
            Repository::<Category>::update(&catalog, fiction.id, NewCategory { name: "Novels".into() })
                .await
                .unwrap();
        assert_eq!(renamed, Category { id: fiction.id, name: "Novels".into() });
    }

    #[tokio::test]
    async fn book_update_replaces_links() {
        let catalog = Catalog::in_memory();
        let fiction = category(&catalog, "Fiction").await;
        let classic = category(&catalog, "Classic").await;
        let book = Repository::<Book>::create(&catalog, dune([fiction.id]))
            .await
            .unwrap();

        let updated = Repository::<Book>::update(
            &catalog,
            book.id,
            NewBook {
                title: "Dune Messiah".into(),
                ..dune([classic.id])
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.id, book.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.categories, vec![classic.id]);
    }

    #[tokio::test]
    async fn failed_snapshot_write_rolls_back() {
        let path = std::env::temp_dir()
            .join(format!("libris-absent-{}", std::process::id()))
            .join("catalog.json");
        let catalog = Catalog::open(Some(path)).await.unwrap();

        let err = Repository::<Category>::create(&catalog, NewCategory { name: "Fiction".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Storage(_)), "{err:?}");
        assert!(Repository::<Category>::list(&catalog).await.unwrap().is_empty());
    }

    #[test]
    fn staging_file_keeps_the_full_name() {
        assert_eq!(
            staging_path(Path::new("/data/catalog.json")),
            PathBuf::from("/data/catalog.json.tmp")
        );
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let path = std::env::temp_dir().join(format!("libris-catalog-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let catalog = Catalog::open(Some(path.clone())).await.unwrap();
        let fiction = category(&catalog, "Fiction").await;
        let book = Repository::<Book>::create(&catalog, dune([fiction.id]))
            .await
            .unwrap();
        drop(catalog);

        let reopened = Catalog::open(Some(path.clone())).await.unwrap();
        assert_eq!(reopened.snapshot_path(), Some(path.as_path()));
        assert_eq!(
            Repository::<Book>::get(&reopened, book.id).await.unwrap(),
            book
        );
        let next = category(&reopened, "Classic").await;
        assert_eq!(next.id, fiction.id + 1);
        assert!(!staging_path(&path).exists());

        std::fs::remove_file(&path).ok();
    }
}
