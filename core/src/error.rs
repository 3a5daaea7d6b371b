//! Error types for the todo store.
//!
//! # Design
//! `NotFound` and `Validation` are the two outcomes a caller is expected to
//! handle and report back to a client. Everything below the persistence
//! boundary lands in `Db` and is surfaced as-is, never retried.

use std::fmt;

use thiserror::Error;

use crate::db::DbError;

/// The kinds of record the store manages. Used to build not-found messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Todo,
    Item,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Todo => write!(f, "Todo"),
            Entity::Item => write!(f, "Item"),
        }
    }
}

/// A single violated constraint on one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Attribute name as it appears in the JSON payload, e.g. `created_by`.
    pub field: &'static str,
    /// Constraint message, e.g. `can't be blank`.
    pub message: &'static str,
}

impl FieldError {
    /// `"Created by can't be blank"`.
    pub fn full_message(&self) -> String {
        format!("{} {}", humanize(self.field), self.message)
    }
}

/// Every constraint violated by an attribute set, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any violation was recorded against `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matches the requested id. `id` is kept as text so unparseable
    /// path segments can be reported the same way.
    #[error("Couldn't find {entity} with 'id'={id}")]
    NotFound { entity: Entity, id: String },

    /// The resulting attribute set violates one or more constraints.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl StoreError {
    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        StoreError::Db(DbError::Sqlite(value))
    }
}

/// `created_by` -> `Created by`.
fn humanize(field: &str) -> String {
    let spaced = field.trim_end_matches("_id").replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
