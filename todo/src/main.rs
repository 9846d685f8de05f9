//! Interactive to-do list in the terminal.
//!
//! The list is stored in a JSON file under the data directory (see
//! [`todo_desk::Config`]); logs go to stderr.

use anyhow::Context;
use std::sync::Arc;
use todo_desk::persistence::load_todos;
use todo_desk::{Config, FileStorage, TodoEnvironment, TodoReducer, TodoState, TodoStore, shell};
use todo_desk_core::environment::{SystemClock, UuidGenerator};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let path = config.storage_path();
    info!(path = %path.display(), quota = config.storage_quota, "Starting todo-desk");

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let storage = Arc::new(FileStorage::with_quota(path, config.storage_quota));
    let state = TodoState::from_items(load_todos(storage.as_ref()));

    let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(UuidGenerator), storage);
    let store = TodoStore::new(state, TodoReducer::new(), env);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell::run(&store, stdin, tokio::io::stdout()).await?;

    info!("Goodbye");
    Ok(())
}
