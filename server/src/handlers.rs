//! Request handlers for `/todos` and the items nested under each todo.
//!
//! Each handler parses its inputs, runs one store operation on the blocking
//! pool, and turns the outcome into a response. Nothing is kept between
//! requests.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use todo_core::{
    Entity, Item, ItemChanges, NewItem, NewTodo, StoreError, StoreResult, Todo, TodoChanges,
    TodoStore,
};

use crate::error::ApiError;
use crate::payload::Payload;
use crate::SharedStore;

// --- todos ---

pub async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = blocking(store, |store| store.list_todos()).await?;
    Ok(Json(todos))
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    Payload(input): Payload<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = input?;
    let todo = blocking(store, move |store| store.create_todo(&input)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(Entity::Todo, &id)?;
    let todo = blocking(store, move |store| store.get_todo(id)).await?;
    Ok(Json(todo))
}

pub async fn update_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Payload(changes): Payload<TodoChanges>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(Entity::Todo, &id)?;
    let changes = match changes {
        Ok(changes) => changes,
        Err(err) => return Err(lookup_error_or(store, move |store| store.get_todo(id), err).await),
    };
    blocking(store, move |store| store.update_todo(id, &changes)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_todo(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(Entity::Todo, &id)?;
    blocking(store, move |store| store.delete_todo(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- items ---

pub async fn list_items(
    State(store): State<SharedStore>,
    Path(todo_id): Path<String>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let todo_id = parse_id(Entity::Todo, &todo_id)?;
    let items = blocking(store, move |store| store.list_items(todo_id)).await?;
    Ok(Json(items))
}

pub async fn create_item(
    State(store): State<SharedStore>,
    Path(todo_id): Path<String>,
    Payload(input): Payload<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let todo_id = parse_id(Entity::Todo, &todo_id)?;
    let input = match input {
        Ok(input) => input,
        Err(err) => {
            return Err(lookup_error_or(store, move |store| store.get_todo(todo_id), err).await)
        }
    };
    let item = blocking(store, move |store| store.create_item(todo_id, &input)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(store): State<SharedStore>,
    Path((todo_id, id)): Path<(String, String)>,
) -> Result<Json<Item>, ApiError> {
    let (todo_id, id) = parse_item_path(&todo_id, &id)?;
    let item = blocking(store, move |store| store.get_item(todo_id, id)).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(store): State<SharedStore>,
    Path((todo_id, id)): Path<(String, String)>,
    Payload(changes): Payload<ItemChanges>,
) -> Result<StatusCode, ApiError> {
    let (todo_id, id) = parse_item_path(&todo_id, &id)?;
    let changes = match changes {
        Ok(changes) => changes,
        Err(err) => {
            let lookup = move |store: &dyn TodoStore| store.get_item(todo_id, id);
            return Err(lookup_error_or(store, lookup, err).await);
        }
    };
    blocking(store, move |store| store.update_item(todo_id, id, &changes)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_item(
    State(store): State<SharedStore>,
    Path((todo_id, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let (todo_id, id) = parse_item_path(&todo_id, &id)?;
    blocking(store, move |store| store.delete_item(todo_id, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs a store call off the async workers; SQLite access is synchronous.
async fn blocking<T, F>(store: SharedStore, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoStore) -> StoreResult<T> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || op(store.as_ref())).await?;
    Ok(outcome?)
}

/// Returns the lookup's error when the addressed record is missing, else
/// `err`. Lets a 404 for the path win over a bad request body.
async fn lookup_error_or<T, F>(store: SharedStore, lookup: F, err: ApiError) -> ApiError
where
    T: Send + 'static,
    F: FnOnce(&dyn TodoStore) -> StoreResult<T> + Send + 'static,
{
    match blocking(store, lookup).await {
        Ok(_) => err,
        Err(lookup_err) => lookup_err,
    }
}

/// A path segment that is not an integer can never match a row, so it is
/// reported as not found rather than as a malformed request.
fn parse_id(entity: Entity, raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::from(StoreError::not_found(entity, raw)))
}

fn parse_item_path(todo_id: &str, id: &str) -> Result<(i64, i64), ApiError> {
    Ok((parse_id(Entity::Todo, todo_id)?, parse_id(Entity::Item, id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id(Entity::Todo, "42").unwrap(), 42);
    }

    #[test]
    fn parse_id_reports_garbage_as_not_found() {
        let err = parse_id(Entity::Todo, "abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Couldn't find Todo with 'id'=abc");
    }

    #[test]
    fn parse_item_path_names_the_bad_segment() {
        let err = parse_item_path("1", "x").unwrap_err();
        assert_eq!(err.to_string(), "Couldn't find Item with 'id'=x");
    }
}
