//! Reducer logic for the todo list.
//!
//! Every command is total: input that fails validation (blank text,
//! unknown id, editing a completed item) leaves the state untouched.
//! Each change to the list bumps the state revision, and a moved revision
//! is what triggers the save effect.

use crate::persistence;
use crate::types::{EditSession, TodoAction, TodoId, TodoItem, TodoState};
use std::sync::Arc;
use todo_desk_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec,
    storage::KeyValueStorage,
};

/// How many fresh ids to draw before giving up on an add
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for save timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of ids for new todos
    pub ids: Arc<dyn IdGenerator>,
    /// Where the list is persisted
    pub storage: Arc<dyn KeyValueStorage>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self { clock, ids, storage }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draw an id no current item uses
    fn fresh_id(state: &TodoState, ids: &dyn IdGenerator) -> Option<TodoId> {
        (0..MAX_ID_ATTEMPTS)
            .map(|_| TodoId::new(ids.next_id()))
            .find(|id| !state.exists(id))
    }

    fn add(state: &mut TodoState, text: &str, env: &TodoEnvironment) {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("Ignoring add with blank text");
            return;
        }

        let Some(id) = Self::fresh_id(state, env.ids.as_ref()) else {
            tracing::error!(attempts = MAX_ID_ATTEMPTS, "Could not generate an unused todo id");
            state.last_error = Some("could not generate a unique id for the new todo".to_string());
            return;
        };

        state.todos.push(TodoItem::new(id, text.to_string()));
        state.input.clear();
        state.bump_revision();
    }

    fn delete(state: &mut TodoState, id: &TodoId) {
        let Some(index) = state.position(id) else {
            tracing::debug!(%id, "Ignoring delete of unknown todo");
            return;
        };

        state.todos.remove(index);
        if state.is_editing(id) {
            state.editing = None;
        }
        state.bump_revision();
    }

    fn toggle(state: &mut TodoState, id: &TodoId) {
        let Some(todo) = state.todos.iter_mut().find(|t| &t.id == id) else {
            tracing::debug!(%id, "Ignoring toggle of unknown todo");
            return;
        };

        todo.completed = !todo.completed;
        let completed = todo.completed;

        // Completed items cannot be edited
        if completed && state.is_editing(id) {
            state.editing = None;
        }
        state.bump_revision();
    }

    fn begin_edit(state: &mut TodoState, id: TodoId) {
        let Some(todo) = state.get(&id) else {
            tracing::debug!(%id, "Ignoring edit of unknown todo");
            return;
        };

        if todo.completed {
            tracing::debug!(%id, "Refusing to edit a completed todo");
            return;
        }

        let buffer = todo.text.clone();
        state.editing = Some(EditSession { id, buffer });
    }

    fn commit_edit(state: &mut TodoState) {
        let Some(edit) = state.editing.as_ref() else {
            tracing::debug!("Ignoring commit with no active edit");
            return;
        };

        let text = edit.buffer.trim();
        if text.is_empty() {
            tracing::debug!(id = %edit.id, "Ignoring commit of blank text, staying in edit mode");
            return;
        }
        let text = text.to_string();
        let id = edit.id.clone();

        state.editing = None;
        match state.todos.iter_mut().find(|t| t.id == id) {
            Some(todo) if todo.text == text => {
                tracing::debug!(%id, "Edit left text unchanged");
            },
            Some(todo) => {
                todo.text = text;
                state.bump_revision();
            },
            None => tracing::debug!(%id, "Edited todo no longer exists, leaving edit mode"),
        }
    }

    /// Applies an action to state, without deciding on effects
    fn apply(state: &mut TodoState, action: TodoAction, env: &TodoEnvironment) {
        match action {
            // ========== Commands ==========
            TodoAction::SetInput { text } => state.input = text,
            TodoAction::AddTodo { text } => Self::add(state, &text, env),
            TodoAction::DeleteTodo { id } => Self::delete(state, &id),
            TodoAction::ToggleComplete { id } => Self::toggle(state, &id),
            TodoAction::BeginEdit { id } => Self::begin_edit(state, id),
            TodoAction::SetEditBuffer { text } => match state.editing.as_mut() {
                Some(edit) => edit.buffer = text,
                None => tracing::debug!("Ignoring edit buffer update with no active edit"),
            },
            TodoAction::CommitEdit => Self::commit_edit(state),
            TodoAction::CancelEdit => state.editing = None,

            // ========== Events ==========
            TodoAction::Persisted { at } => {
                state.last_saved_at = Some(at);
                state.last_error = None;
            },
            TodoAction::PersistFailed { error } => {
                state.last_error = Some(error);
            },
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing");

        let before = state.revision();
        Self::apply(state, action, env);

        if state.revision() == before {
            return SmallVec::new();
        }

        smallvec![persistence::save_effect(&state.todos, &env.storage, &env.clock)]
    }
}
