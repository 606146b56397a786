//! Catalog entities and the data-access interface over them.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::DbResult;
use crate::RecordId;

/// A top-level persisted record type.
pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Table name, also used in log fields and error messages.
    const TABLE: &'static str;
    /// Human-facing singular label.
    const LABEL: &'static str;
    /// Validated field set without an id, used for create and replace.
    type Draft: Send + 'static;

    fn id(&self) -> RecordId;
}

/// Generic CRUD access to one entity's table.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn list(&self) -> DbResult<Vec<E>>;
    async fn create(&self, draft: E::Draft) -> DbResult<E>;
    async fn get(&self, id: RecordId) -> DbResult<E>;
    async fn update(&self, id: RecordId, draft: E::Draft) -> DbResult<E>;
    async fn delete(&self, id: RecordId) -> DbResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
}

impl Category {
    pub const NAME_MAX_CHARS: usize = 100;
}

impl Entity for Category {
    const TABLE: &'static str = "category";
    const LABEL: &'static str = "Category";
    type Draft = NewCategory;

    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(with = "iso_date")]
    pub date_published: Date,
    /// Associated category ids, ascending.
    pub categories: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub date_published: Date,
    pub categories: BTreeSet<RecordId>,
}

impl Book {
    pub const TITLE_MAX_CHARS: usize = 100;
    pub const AUTHOR_MAX_CHARS: usize = 100;
    pub const ISBN_MAX_CHARS: usize = 13;
}

impl Entity for Book {
    const TABLE: &'static str = "book";
    const LABEL: &'static str = "Book";
    type Draft = NewBook;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// `YYYY-MM-DD` calendar dates, usable with `#[serde(with = "iso_date")]`.
pub mod iso_date {
    use serde::{de, ser, Deserialize, Deserializer, Serializer};
    use time::macros::{date, format_description};
    use time::Date;

    /// Earliest calendar date the catalog accepts.
    pub const EARLIEST: Date = date!(0001 - 01 - 01);

    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn format(date: &Date) -> Result<String, time::error::Format> {
        date.format(format_description!("[year]-[month]-[day]"))
    }

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format(date).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(de::Error::custom)
    }
}
