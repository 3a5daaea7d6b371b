//! Domain core for the todo service.
//!
//! # Overview
//! Todos own an ordered list of items. This crate holds the records, their
//! validation rules, the SQLite schema, and `TodoStore`, the persistence
//! gateway the HTTP layer is written against. Nothing here knows about HTTP.
//!
//! # Design
//! - Records are plain data; validation is an explicit call made by the
//!   store before every write.
//! - Deleting a todo removes its items in the same transaction.
//! - The store is passed around as a handle, never held in a global.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Entity, FieldError, StoreError, ValidationErrors};
pub use store::{SqliteStore, StoreResult, TodoStore};
pub use types::{Item, ItemChanges, ItemId, NewItem, NewTodo, Todo, TodoChanges, TodoId};
