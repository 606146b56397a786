use libris_db::{Book, NewBook};
use libris_http::{
    resource::Resource,
    schema::{FieldRule, Schema, ValidatedFields},
    AppError,
};

/// Request schema and draft construction for books.
pub struct BookResource {
    schema: Schema,
}

impl BookResource {
    pub fn new(reject_future_dates: bool) -> Self {
        let schema = Schema::new("book")
            .field(FieldRule::text("title", Book::TITLE_MAX_CHARS))
            .field(FieldRule::text("author", Book::AUTHOR_MAX_CHARS))
            .field(FieldRule::text("isbn", Book::ISBN_MAX_CHARS))
            .field(FieldRule::date("date_published", !reject_future_dates))
            .field(FieldRule::id_set("categories"));

        Self { schema }
    }
}

impl Resource for BookResource {
    type Entity = Book;

    fn collection(&self) -> &'static str {
        "books"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn draft(&self, mut fields: ValidatedFields) -> Result<NewBook, AppError> {
        Ok(NewBook {
            title: fields.take_text("title")?,
            author: fields.take_text("author")?,
            isbn: fields.take_text("isbn")?,
            date_published: fields.take_date("date_published")?,
            categories: fields.take_ids("categories")?,
        })
    }
}
