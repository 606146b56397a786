use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::Date;

use super::{Catalog, Tables};
use crate::entity::{iso_date, Book, Category, Entity, NewBook, Repository};
use crate::error::{DbError, DbResult};
use crate::table::check_text;
use crate::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BookRow {
    title: String,
    author: String,
    isbn: String,
    #[serde(with = "iso_date")]
    date_published: Date,
}

impl From<&NewBook> for BookRow {
    fn from(draft: &NewBook) -> Self {
        Self {
            title: draft.title.clone(),
            author: draft.author.clone(),
            isbn: draft.isbn.clone(),
            date_published: draft.date_published,
        }
    }
}

impl Tables {
    fn book(&self, id: RecordId) -> DbResult<Book> {
        let row = self
            .books
            .get(id)
            .ok_or_else(|| DbError::not_found(Book::TABLE, id))?;
        Ok(self.assemble(id, row))
    }

    fn assemble(&self, id: RecordId, row: &BookRow) -> Book {
        Book {
            id,
            title: row.title.clone(),
            author: row.author.clone(),
            isbn: row.isbn.clone(),
            date_published: row.date_published,
            categories: self.book_categories.rights(id),
        }
    }

    /// Column constraints plus the foreign key on every category id.
    fn check_book(&self, draft: &NewBook) -> DbResult<()> {
        check_text(Book::TABLE, "title", &draft.title, Book::TITLE_MAX_CHARS)?;
        check_text(Book::TABLE, "author", &draft.author, Book::AUTHOR_MAX_CHARS)?;
        check_text(Book::TABLE, "isbn", &draft.isbn, Book::ISBN_MAX_CHARS)?;

        if let Some(missing) = draft
            .categories
            .iter()
            .find(|id| !self.categories.contains(**id))
        {
            return Err(DbError::ForeignKey {
                table: Book::TABLE,
                field: "categories",
                target: Category::TABLE,
                id: *missing,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<Book> for Catalog {
    async fn list(&self) -> DbResult<Vec<Book>> {
        let tables = self.read().await;
        Ok(tables
            .books
            .iter()
            .map(|(id, row)| tables.assemble(id, row))
            .collect())
    }

    async fn create(&self, draft: NewBook) -> DbResult<Book> {
        let book = self
            .mutate(move |tables| {
                tables.check_book(&draft)?;
                let id = tables.books.insert(BookRow::from(&draft));
                tables.book_categories.set(id, &draft.categories);
                tables.book(id)
            })
            .await?;

        tracing::debug!(
            table = Book::TABLE,
            id = book.id,
            categories = book.categories.len(),
            "record created"
        );
        Ok(book)
    }

    async fn get(&self, id: RecordId) -> DbResult<Book> {
        self.read().await.book(id)
    }

    async fn update(&self, id: RecordId, draft: NewBook) -> DbResult<Book> {
        self.mutate(move |tables| {
            if !tables.books.contains(id) {
                return Err(DbError::not_found(Book::TABLE, id));
            }
            tables.check_book(&draft)?;
            tables.books.replace(id, BookRow::from(&draft));
            tables.book_categories.set(id, &draft.categories);
            tables.book(id)
        })
        .await
    }

    async fn delete(&self, id: RecordId) -> DbResult<()> {
        self.mutate(move |tables| {
            tables
                .books
                .remove(id)
                .ok_or_else(|| DbError::not_found(Book::TABLE, id))?;
            tables.book_categories.unlink_left(id);
            Ok(())
        })
        .await?;

        tracing::debug!(table = Book::TABLE, id, "record deleted");
        Ok(())
    }
}
