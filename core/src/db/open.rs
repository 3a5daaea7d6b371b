use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use tracing::{error, info};

use super::migrations::apply_migrations;
use super::DbResult;

/// Opens (or creates) a SQLite database file and applies pending migrations.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    let conn = Connection::open(path).map_err(|err| {
        error!(path = %path.display(), error = %err, "failed to open database");
        err
    })?;
    let conn = bootstrap(conn)?;
    info!(
        path = %path.display(),
        duration_ms = saturating_millis(started_at.elapsed()),
        "database ready"
    );
    Ok(conn)
}

/// Opens a private in-memory database. Its contents vanish with the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    bootstrap(conn)
}

fn bootstrap(mut conn: Connection) -> DbResult<Connection> {
    conn.pragma_update(None, "foreign_keys", true)?;
    apply_migrations(&mut conn).map_err(|err| {
        error!(error = %err, "schema migration failed");
        err
    })?;
    Ok(conn)
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
