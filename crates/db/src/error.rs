//! Storage error taxonomy.

use thiserror::Error;

use crate::RecordId;

/// Failures raised by the catalog store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("{table} record {id} not found")]
    NotFound { table: &'static str, id: RecordId },

    /// A column constraint (non-blank, max length) rejected the write.
    #[error("{table}.{field}: {message}")]
    Constraint {
        table: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("{table}.{field} references missing {target} record {id}")]
    ForeignKey {
        table: &'static str,
        field: &'static str,
        target: &'static str,
        id: RecordId,
    },

    #[error("storage failure: {0}")]
    Storage(String),
}

impl DbError {
    pub fn not_found(table: &'static str, id: RecordId) -> Self {
        Self::NotFound { table, id }
    }

    pub fn constraint(table: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self::Constraint {
            table,
            field,
            message: message.into(),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
