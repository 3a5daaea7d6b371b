//! Domain records and the attribute sets used to create or change them.
//!
//! # Design
//! Records are plain data. Creation and update payloads carry every field as
//! `Option` so a missing key and a blank value fail validation the same way
//! instead of being rejected earlier by the JSON decoder.
//!
//! Update payloads use `Option<Option<_>>`: `None` leaves the field alone,
//! `Some(None)` (an explicit `null`) clears it, `Some(Some(v))` replaces it.
//! A cleared required field then fails validation like any blank value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationErrors;

pub type TodoId = i64;
pub type ItemId = i64;

const BLANK: &str = "can't be blank";

/// A task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Returns the record as it would look after `changes`. Only supplied
    /// fields are replaced; timestamps are left to the store.
    pub fn apply(&self, changes: &TodoChanges) -> Todo {
        let mut next = self.clone();
        if let Some(title) = &changes.title {
            next.title = title.clone().unwrap_or_default();
        }
        if let Some(created_by) = &changes.created_by {
            next.created_by = created_by.clone().unwrap_or_default();
        }
        next
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_todo_fields(Some(&self.title), Some(&self.created_by))
    }
}

/// Attributes for a new `Todo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: Option<String>,
    pub created_by: Option<String>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            created_by: Some(created_by.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_todo_fields(self.title.as_deref(), self.created_by.as_deref())
    }
}

/// Partial update for an existing `Todo`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoChanges {
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by: Option<Option<String>>,
}

impl TodoChanges {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(Some(title.into())),
            ..Self::default()
        }
    }
}

/// A single entry of a `Todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub todo_id: TodoId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn apply(&self, changes: &ItemChanges) -> Item {
        let mut next = self.clone();
        if let Some(name) = &changes.name {
            next.name = name.clone().unwrap_or_default();
        }
        next
    }
}

/// Attributes for a new `Item`. The owning todo comes from the request path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub name: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<Option<String>>,
}

impl ItemChanges {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(Some(name.into())),
        }
    }
}

/// Keeps a present `null` apart from an absent key; serde maps both to
/// `None` by default. Absent keys never reach this function (`default`).
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Checks the item's own fields and whether its parent exists.
///
/// `todo_exists` is resolved by the caller, inside the same transaction as
/// the write that follows.
pub fn validate_item(name: Option<&str>, todo_exists: bool) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !todo_exists {
        errors.add("todo", "must exist");
    }
    if is_blank(name) {
        errors.add("name", BLANK);
    }
    errors.into_result()
}

fn validate_todo_fields(
    title: Option<&str>,
    created_by: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if is_blank(title) {
        errors.add("title", BLANK);
    }
    if is_blank(created_by) {
        errors.add("created_by", BLANK);
    }
    errors.into_result()
}

/// Missing, empty, and whitespace-only values are all blank.
fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
