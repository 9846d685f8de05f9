//! A local to-do list persisted to a key-value store.
//!
//! The list is an ordered collection of items that can be added,
//! completed, edited in place, and deleted. The whole list is written back
//! to storage under the key `"todos"` after every change, and read once
//! at startup.
//!
//! - [`types`]: items, state, and actions
//! - [`reducer`]: the list rules and the save-after-change effect
//! - [`persistence`]: the stored record format and startup loading
//! - [`storage`]: a file-backed key-value store
//! - [`shell`]: a line-oriented terminal front end
//! - [`config`]: environment-driven settings for the binary
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo_desk::{FileStorage, TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//! use todo_desk::persistence::load_todos;
//! use todo_desk_core::environment::{SystemClock, UuidGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("local-storage.json"));
//! let state = TodoState::from_items(load_todos(storage.as_ref()));
//!
//! let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(UuidGenerator), storage);
//! let store = TodoStore::new(state, TodoReducer::new(), env);
//!
//! // Saved to storage before `send` returns
//! store.send(TodoAction::AddTodo { text: "Buy milk".to_string() }).await?;
//!
//! let completed = store.state(TodoState::completed_count).await;
//! println!("Completed: {completed}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod persistence;
pub mod reducer;
pub mod shell;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use storage::FileStorage;
pub use types::{EditSession, TodoAction, TodoId, TodoItem, TodoState};

/// The todo list runtime: state, reducer, and environment behind one handle
pub type TodoStore = todo_desk_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
