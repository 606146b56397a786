//! Row tables with auto-increment keys and a two-column link table.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, DbResult};
use crate::RecordId;

/// Rows keyed by an auto-increment id. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<R> {
    name: String,
    next_id: RecordId,
    rows: BTreeMap<RecordId, R>,
}

impl<R: Clone> Table<R> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.rows.get(&id)
    }

    /// Rows in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &R)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn insert(&mut self, row: R) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    /// Replace an existing row; `false` when the id is absent.
    pub fn replace(&mut self, id: RecordId, row: R) -> bool {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: RecordId) -> Option<R> {
        self.rows.remove(&id)
    }
}

/// Many-to-many association stored as `(left, right)` pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkTable {
    pairs: BTreeSet<(RecordId, RecordId)>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Right-hand ids linked to `left`, ascending.
    pub fn rights(&self, left: RecordId) -> Vec<RecordId> {
        self.pairs
            .range((left, RecordId::MIN)..=(left, RecordId::MAX))
            .map(|(_, right)| *right)
            .collect()
    }

    /// Replace every link of `left` with `rights`.
    pub fn set(&mut self, left: RecordId, rights: &BTreeSet<RecordId>) {
        self.unlink_left(left);
        self.pairs.extend(rights.iter().map(|right| (left, *right)));
    }

    /// Drop every link of `left`, returning how many were removed.
    pub fn unlink_left(&mut self, left: RecordId) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(l, _)| *l != left);
        before - self.pairs.len()
    }

    /// Drop every link pointing at `right`, returning how many were removed.
    pub fn unlink_right(&mut self, right: RecordId) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(_, r)| *r != right);
        before - self.pairs.len()
    }
}

/// Column checks shared by every text field of the catalog.
pub(crate) fn check_text(
    table: &'static str,
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::constraint(table, field, "must not be blank"));
    }
    if value.chars().count() > max_chars {
        return Err(DbError::constraint(
            table,
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}
