use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use todo_server::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    todo_server::logging::init(&config.log_filter)?;

    let store = config.open_store()?;
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, database = %config.database_path, "listening");

    todo_server::run(listener, Arc::new(store)).await?;
    Ok(())
}
