//! Domain types for the to-do list.
//!
//! The list is an ordered `Vec` of items: insertion order is display
//! order. At most one item can be in edit mode at a time, and the state
//! carries the text buffers a UI binds its inputs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_desk_macros::{Action, State};

/// Unique identifier for a todo item
///
/// Opaque string, serialized as a bare JSON string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps an identifier string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
///
/// This is also the persisted record shape: `{"id", "text", "completed"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Trimmed, non-empty text
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed item
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

/// The item currently being edited and its pending text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    /// Item under edit
    pub id: TodoId,
    /// Pending text, not yet trimmed or validated
    pub buffer: String,
}

/// State of the todo list
///
/// `revision` increases once per change to `todos`; the reducer persists
/// the list whenever an action moved it.
#[derive(State, Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// All todos in display order
    pub todos: Vec<TodoItem>,
    /// Contents of the add-input
    pub input: String,
    /// Active edit, if any
    pub editing: Option<EditSession>,
    /// Last persistence problem, cleared by the next successful save
    pub last_error: Option<String>,
    /// When the list was last written to storage
    pub last_saved_at: Option<DateTime<Utc>>,
    #[revision]
    revision: u64,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `todos`, as loaded from storage
    #[must_use]
    pub fn from_items(todos: Vec<TodoItem>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns true if there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Display position of a todo
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Returns true if `id` is the item in edit mode
    #[must_use]
    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.editing.as_ref().is_some_and(|edit| &edit.id == id)
    }
}

/// Actions for the todo list
///
/// Commands come from the UI. Events are fed back by the persistence
/// effect and never touch the list itself.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Replace the add-input contents
    #[command]
    SetInput {
        /// New contents
        text: String,
    },

    /// Command: Append a todo with the given text
    #[command]
    AddTodo {
        /// Untrimmed text; blank text is ignored
        text: String,
    },

    /// Command: Remove a todo
    #[command]
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Command: Flip a todo's completion flag
    #[command]
    ToggleComplete {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: Enter edit mode for a todo
    #[command]
    BeginEdit {
        /// Todo to edit
        id: TodoId,
    },

    /// Command: Replace the edit buffer
    #[command]
    SetEditBuffer {
        /// New buffer contents
        text: String,
    },

    /// Command: Save the edit buffer into the edited todo
    #[command]
    CommitEdit,

    /// Command: Leave edit mode without saving
    #[command]
    CancelEdit,

    // ========== Events ==========
    /// Event: The list was written to storage
    #[event]
    Persisted {
        /// When the write completed
        at: DateTime<Utc>,
    },

    /// Event: Writing the list to storage failed
    #[event]
    PersistFailed {
        /// Error message
        error: String,
    },
}
