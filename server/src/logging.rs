//! Process-wide `tracing` subscriber setup.

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Installs a formatted stderr subscriber filtered by `filter`
/// (`RUST_LOG` syntax, e.g. `info,todo_core=debug`).
///
/// Fails when the filter does not parse or a subscriber is already set.
pub fn init(filter: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
}
