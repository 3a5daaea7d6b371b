//! HTTP front end for the todo store.
//!
//! # Design
//! The router is built around an injected `TodoStore` handle so tests can
//! drive it with an in-memory database and the binary with a file. Handlers
//! hold no state of their own.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod payload;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use todo_core::TodoStore;
use tracing::{error, info};

use handlers::{
    create_item, create_todo, delete_item, delete_todo, get_item, get_todo, list_items,
    list_todos, update_item, update_todo,
};

pub type SharedStore = Arc<dyn TodoStore>;

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .route("/todos/{todo_id}/items", get(list_items).post(create_item))
        .route(
            "/todos/{todo_id}/items/{id}",
            get(get_item)
                .put(update_item)
                .patch(update_item)
                .delete(delete_item),
        )
        .with_state(store)
}

/// Serves `app(store)` on `listener` until Ctrl-C.
pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(err) => {
            error!(error = %err, "cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
