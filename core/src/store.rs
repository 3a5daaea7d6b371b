//! Persistence gateway for todos and their items.
//!
//! # Design
//! `TodoStore` is the seam the HTTP layer depends on; `SqliteStore` is the
//! production implementation. Every write validates before touching the
//! database and runs inside one transaction, so a failed validation or a
//! fault midway leaves the previous state untouched. Item operations resolve
//! the owning todo in the same transaction before reading or writing the item.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::db::{open_db, open_db_in_memory};
use crate::error::{Entity, StoreError};
use crate::types::{
    validate_item, Item, ItemChanges, ItemId, NewItem, NewTodo, Todo, TodoChanges, TodoId,
};

pub type StoreResult<T> = Result<T, StoreError>;

const TODO_COLUMNS: &str = "id, title, created_by, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, name, todo_id, created_at, updated_at";

/// Atomic CRUD over todos and the items they own.
pub trait TodoStore: Send + Sync {
    /// All todos in creation order.
    fn list_todos(&self) -> StoreResult<Vec<Todo>>;
    fn get_todo(&self, id: TodoId) -> StoreResult<Todo>;
    fn create_todo(&self, input: &NewTodo) -> StoreResult<Todo>;
    /// Applies only the supplied fields. The stored row is unchanged when the
    /// result fails validation.
    fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> StoreResult<Todo>;
    /// Removes the todo together with every item it owns.
    fn delete_todo(&self, id: TodoId) -> StoreResult<()>;

    fn list_items(&self, todo_id: TodoId) -> StoreResult<Vec<Item>>;
    fn get_item(&self, todo_id: TodoId, id: ItemId) -> StoreResult<Item>;
    fn create_item(&self, todo_id: TodoId, input: &NewItem) -> StoreResult<Item>;
    fn update_item(&self, todo_id: TodoId, id: ItemId, changes: &ItemChanges)
        -> StoreResult<Item>;
    fn delete_item(&self, todo_id: TodoId, id: ItemId) -> StoreResult<()>;
}

/// `TodoStore` backed by a single SQLite connection.
///
/// Access is serialized through a mutex; SQLite allows one writer at a time
/// anyway.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Wraps an already migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// A request that panicked while holding the lock dropped its
    /// transaction on unwind, which rolls it back, so the connection is
    /// still consistent and is taken over instead of failing every later call.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("recovering store connection after a panicked request");
            self.conn.clear_poison();
            poisoned.into_inner()
        })
    }
}

impl TodoStore for SqliteStore {
    fn list_todos(&self) -> StoreResult<Vec<Todo>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id"))?;
        let todos = stmt
            .query_map([], todo_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = todos.len(), "listed todos");
        Ok(todos)
    }

    fn get_todo(&self, id: TodoId) -> StoreResult<Todo> {
        let conn = self.lock();
        require_todo(&conn, id)
    }

    fn create_todo(&self, input: &NewTodo) -> StoreResult<Todo> {
        input.validate()?;

        let now = Utc::now();
        let title = input.title.clone().unwrap_or_default();
        let created_by = input.created_by.clone().unwrap_or_default();

        let conn = self.lock();
        conn.execute(
            "INSERT INTO todos (title, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![title, created_by, now],
        )?;
        let todo = Todo {
            id: conn.last_insert_rowid(),
            title,
            created_by,
            created_at: now,
            updated_at: now,
        };
        info!(todo_id = todo.id, "created todo");
        Ok(todo)
    }

    fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> StoreResult<Todo> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let mut next = require_todo(&tx, id)?.apply(changes);
        next.validate()?;
        next.updated_at = Utc::now();

        tx.execute(
            "UPDATE todos SET title = ?1, created_by = ?2, updated_at = ?3 WHERE id = ?4",
            params![next.title, next.created_by, next.updated_at, id],
        )?;
        tx.commit()?;

        info!(todo_id = id, "updated todo");
        Ok(next)
    }

    fn delete_todo(&self, id: TodoId) -> StoreResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, id)?;
        let items = tx.execute("DELETE FROM items WHERE todo_id = ?1", [id])?;
        tx.execute("DELETE FROM todos WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(todo_id = id, items, "deleted todo");
        Ok(())
    }

    fn list_items(&self, todo_id: TodoId) -> StoreResult<Vec<Item>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, todo_id)?;
        let mut stmt = tx.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE todo_id = ?1 ORDER BY id"
        ))?;
        let items = stmt
            .query_map([todo_id], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get_item(&self, todo_id: TodoId, id: ItemId) -> StoreResult<Item> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, todo_id)?;
        require_item(&tx, todo_id, id)
    }

    fn create_item(&self, todo_id: TodoId, input: &NewItem) -> StoreResult<Item> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, todo_id)?;
        validate_item(input.name.as_deref(), true)?;

        let now = Utc::now();
        let name = input.name.clone().unwrap_or_default();
        tx.execute(
            "INSERT INTO items (name, todo_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![name, todo_id, now],
        )?;
        let item = Item {
            id: tx.last_insert_rowid(),
            name,
            todo_id,
            created_at: now,
            updated_at: now,
        };
        tx.commit()?;

        info!(todo_id, item_id = item.id, "created item");
        Ok(item)
    }

    fn update_item(
        &self,
        todo_id: TodoId,
        id: ItemId,
        changes: &ItemChanges,
    ) -> StoreResult<Item> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, todo_id)?;
        let mut next = require_item(&tx, todo_id, id)?.apply(changes);
        validate_item(Some(next.name.as_str()), true)?;
        next.updated_at = Utc::now();

        tx.execute(
            "UPDATE items SET name = ?1, updated_at = ?2 WHERE id = ?3",
            params![next.name, next.updated_at, id],
        )?;
        tx.commit()?;

        info!(todo_id, item_id = id, "updated item");
        Ok(next)
    }

    fn delete_item(&self, todo_id: TodoId, id: ItemId) -> StoreResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        require_todo(&tx, todo_id)?;
        require_item(&tx, todo_id, id)?;
        tx.execute("DELETE FROM items WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(todo_id, item_id = id, "deleted item");
        Ok(())
    }
}

fn require_todo(conn: &Connection, id: TodoId) -> StoreResult<Todo> {
    conn.query_row(
        &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
        [id],
        todo_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found(Entity::Todo, id))
}

/// An item that exists but belongs to another todo is reported as missing.
fn require_item(conn: &Connection, todo_id: TodoId, id: ItemId) -> StoreResult<Item> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND todo_id = ?2"),
        [id, todo_id],
        item_from_row,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found(Entity::Item, id))
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        todo_id: row.get("todo_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
