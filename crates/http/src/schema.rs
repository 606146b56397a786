//! Declarative field rules for request bodies.
//!
//! A [`Schema`] lists the fields an entity accepts. [`Schema::validate`] walks
//! the rules against a JSON body and yields either typed [`ValidatedFields`]
//! or a [`FieldErrors`] map with one message per offending field. Fields not
//! named by a rule (including a client-supplied `id`) are ignored.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::anyhow;
use libris_db::{iso_date, RecordId};
use serde::Serialize;
use serde_json::{json, Map, Value};
use time::{Date, OffsetDateTime};

use crate::error::AppError;

/// Key used for errors that concern the body as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// `field -> message` map returned with 400 responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record a message; the first message for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed, non-blank string of at most `max_chars` characters.
    Text { max_chars: usize },
    /// `YYYY-MM-DD`; dates after today are refused unless `allow_future`.
    Date { allow_future: bool },
    /// Set of record ids; duplicates collapse.
    IdSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn text(name: &'static str, max_chars: usize) -> Self {
        Self {
            name,
            kind: FieldKind::Text { max_chars },
            required: true,
        }
    }

    pub const fn date(name: &'static str, allow_future: bool) -> Self {
        Self {
            name,
            kind: FieldKind::Date { allow_future },
            required: true,
        }
    }

    pub const fn id_set(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::IdSet,
            required: true,
        }
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn check(&self, value: &Value, today: Date) -> Result<FieldValue, String> {
        match self.kind {
            FieldKind::Text { max_chars } => {
                let text = match value {
                    Value::String(text) => text.trim().to_string(),
                    Value::Number(number) => number.to_string(),
                    _ => return Err("Not a valid string.".to_string()),
                };
                if text.is_empty() {
                    return Err("This field may not be blank.".to_string());
                }
                if text.chars().count() > max_chars {
                    return Err(format!(
                        "Ensure this field has no more than {max_chars} characters."
                    ));
                }
                Ok(FieldValue::Text(text))
            }
            FieldKind::Date { allow_future } => {
                let date = value
                    .as_str()
                    .and_then(|text| iso_date::parse(text.trim()).ok())
                    .filter(|date| *date >= iso_date::EARLIEST)
                    .ok_or_else(|| {
                        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
                            .to_string()
                    })?;
                if !allow_future && date > today {
                    return Err("Date cannot be in the future.".to_string());
                }
                Ok(FieldValue::Date(date))
            }
            FieldKind::IdSet => {
                let Value::Array(items) = value else {
                    return Err(format!(
                        "Expected a list of items but got type \"{}\".",
                        type_name(value)
                    ));
                };
                items
                    .iter()
                    .map(parse_id)
                    .collect::<Result<BTreeSet<_>, _>>()
                    .map(FieldValue::IdSet)
            }
        }
    }

    fn describe(&self) -> Value {
        match self.kind {
            FieldKind::Text { max_chars } => json!({"type": "string", "maxLength": max_chars}),
            FieldKind::Date { .. } => json!({"type": "string", "format": "date"}),
            FieldKind::IdSet => json!({
                "type": "array",
                "items": {"type": "integer", "minimum": 1},
                "uniqueItems": true
            }),
        }
    }
}

/// Accepts positive integers and their decimal string form.
fn parse_id(item: &Value) -> Result<RecordId, String> {
    match item {
        Value::Number(number) => match (number.as_u64(), number.as_i64()) {
            (Some(0), _) => Err(missing_pk(0)),
            (Some(id), _) => Ok(id),
            (None, Some(negative)) => Err(missing_pk(negative)),
            (None, None) => Err(incorrect_pk(item)),
        },
        Value::String(text) => match text.trim().parse::<RecordId>() {
            Ok(0) => Err(missing_pk(0)),
            Ok(id) => Ok(id),
            Err(_) => Err(incorrect_pk(item)),
        },
        _ => Err(incorrect_pk(item)),
    }
}

fn missing_pk(shown: impl std::fmt::Display) -> String {
    format!("Invalid pk \"{shown}\" - object does not exist.")
}

fn incorrect_pk(item: &Value) -> String {
    format!(
        "Incorrect type. Expected pk value, received {}.",
        type_name(item)
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(Date),
    IdSet(BTreeSet<RecordId>),
}

/// Typed values produced by a successful validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedFields(BTreeMap<&'static str, FieldValue>);

impl ValidatedFields {
    pub fn take_text(&mut self, name: &str) -> Result<String, AppError> {
        match self.0.remove(name) {
            Some(FieldValue::Text(text)) => Ok(text),
            other => Err(unexpected(name, "text", other)),
        }
    }

    pub fn take_date(&mut self, name: &str) -> Result<Date, AppError> {
        match self.0.remove(name) {
            Some(FieldValue::Date(date)) => Ok(date),
            other => Err(unexpected(name, "date", other)),
        }
    }

    /// Missing optional id sets read as empty.
    pub fn take_ids(&mut self, name: &str) -> Result<BTreeSet<RecordId>, AppError> {
        match self.0.remove(name) {
            Some(FieldValue::IdSet(ids)) => Ok(ids),
            None => Ok(BTreeSet::new()),
            other => Err(unexpected(name, "id set", other)),
        }
    }
}

fn unexpected(name: &str, wanted: &str, found: Option<FieldValue>) -> AppError {
    AppError::Internal(anyhow!(
        "field '{name}' expected as {wanted}, validated as {found:?}"
    ))
}

/// Ordered field rules for one entity.
#[derive(Debug, Clone)]
pub struct Schema {
    entity: &'static str,
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rules: Vec::new(),
        }
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn validate(&self, body: &Value) -> Result<ValidatedFields, FieldErrors> {
        self.validate_on(body, OffsetDateTime::now_utc().date())
    }

    /// Validation against an explicit "today", for date rules.
    pub fn validate_on(&self, body: &Value, today: Date) -> Result<ValidatedFields, FieldErrors> {
        let object = expect_object(body)?;
        let mut values = ValidatedFields::default();
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            match object.get(rule.name) {
                None if rule.required => errors.insert(rule.name, "This field is required."),
                None => {}
                Some(Value::Null) if rule.required => {
                    errors.insert(rule.name, "This field may not be null.")
                }
                Some(Value::Null) => {}
                Some(value) => match rule.check(value, today) {
                    Ok(checked) => {
                        values.0.insert(rule.name, checked);
                    }
                    Err(message) => errors.insert(rule.name, message),
                },
            }
        }

        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }

    /// JSON schema of the writable fields, as used in OpenAPI components.
    pub fn describe(&self) -> Value {
        let properties: Map<String, Value> = self
            .rules
            .iter()
            .map(|rule| (rule.name.to_string(), rule.describe()))
            .collect();
        let required: Vec<&str> = self
            .rules
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| rule.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

/// The body must be a JSON object before any field rule applies.
pub fn expect_object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    body.as_object().ok_or_else(|| {
        FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(body)
            ),
        )
    })
}
