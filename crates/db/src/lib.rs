//! Catalog storage for Libris.
//!
//! Books and categories live in auto-increment [`table::Table`]s, their
//! many-to-many association in a [`table::LinkTable`]. [`Catalog`] guards all
//! three behind one lock and exposes them through the generic [`Repository`]
//! interface, one implementation per [`Entity`].

pub mod catalog;
pub mod entity;
pub mod error;
pub mod table;

/// Server-assigned identifier shared by every table.
pub type RecordId = u64;

pub use catalog::Catalog;
pub use entity::{iso_date, Book, Category, Entity, NewBook, NewCategory, Repository};
pub use error::{DbError, DbResult};
