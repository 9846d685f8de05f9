//! Persistence contract for the todo list.
//!
//! The whole list lives under one key as a JSON array of
//! `{"id": string, "text": string, "completed": bool}` records. It is read
//! once at startup and rewritten in full after every change.

use crate::types::{TodoAction, TodoId, TodoItem};
use std::collections::HashSet;
use std::sync::Arc;
use todo_desk_core::effect::Effect;
use todo_desk_core::environment::Clock;
use todo_desk_core::storage::KeyValueStorage;

/// Key holding the serialized list
pub const STORAGE_KEY: &str = "todos";

/// Serialize the list into its stored form
///
/// # Errors
///
/// Returns the serializer error; with string and bool fields only this
/// does not happen in practice.
pub fn encode(todos: &[TodoItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(todos)
}

/// Parse a stored list without any cleanup
///
/// # Errors
///
/// Returns an error if `raw` is not a JSON array of todo records.
pub fn decode(raw: &str) -> Result<Vec<TodoItem>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Load the list at startup
///
/// Never fails: an absent key, unreadable storage, or malformed content
/// all yield an empty list. Records that would break the list invariants
/// (blank text, repeated id) are dropped; text is trimmed.
pub fn load_todos(storage: &dyn KeyValueStorage) -> Vec<TodoItem> {
    let raw = match storage.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key = STORAGE_KEY, "No stored todos, starting empty");
            return Vec::new();
        },
        Err(error) => {
            tracing::warn!(
                key = STORAGE_KEY,
                %error,
                "Could not read stored todos, starting empty"
            );
            return Vec::new();
        },
    };

    match decode(&raw) {
        Ok(items) => sanitize(items),
        Err(error) => {
            tracing::warn!(key = STORAGE_KEY, %error, "Stored todos are malformed, starting empty");
            Vec::new()
        },
    }
}

/// Drop records that violate the list invariants
fn sanitize(items: Vec<TodoItem>) -> Vec<TodoItem> {
    let total = items.len();
    let mut seen: HashSet<TodoId> = HashSet::with_capacity(total);
    let mut kept = Vec::with_capacity(total);

    for mut item in items {
        let trimmed = item.text.trim();
        if trimmed.is_empty() {
            tracing::warn!(id = %item.id, "Dropping stored todo with blank text");
            continue;
        }
        if !seen.insert(item.id.clone()) {
            tracing::warn!(id = %item.id, "Dropping stored todo with duplicate id");
            continue;
        }
        if trimmed.len() != item.text.len() {
            item.text = trimmed.to_string();
        }
        kept.push(item);
    }

    tracing::info!(loaded = kept.len(), dropped = total - kept.len(), "Loaded stored todos");
    kept
}

/// Build the effect that writes `todos` to storage
///
/// The list is serialized now, so the write reflects the state right
/// after the mutation even though it runs later. The effect reports back
/// with [`TodoAction::Persisted`] or [`TodoAction::PersistFailed`].
pub fn save_effect(
    todos: &[TodoItem],
    storage: &Arc<dyn KeyValueStorage>,
    clock: &Arc<dyn Clock>,
) -> Effect<TodoAction> {
    let payload = match encode(todos) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(%error, "Could not serialize todos");
            let error = error.to_string();
            return Effect::future(async move { Some(TodoAction::PersistFailed { error }) });
        },
    };

    let storage = Arc::clone(storage);
    let clock = Arc::clone(clock);

    Effect::future(async move {
        match storage.set(STORAGE_KEY, &payload) {
            Ok(()) => {
                tracing::debug!(bytes = payload.len(), "Todos persisted");
                Some(TodoAction::Persisted { at: clock.now() })
            },
            Err(error) => {
                tracing::warn!(%error, "Could not persist todos, keeping in-memory state");
                Some(TodoAction::PersistFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can unwrap

    use super::*;
    use todo_desk_testing::{FailingStorage, InMemoryStorage, run_effects, test_clock};

    fn item(id: &str, text: &str, completed: bool) -> TodoItem {
        TodoItem {
            id: TodoId::new(id),
            text: text.to_string(),
            completed,
        }
    }

    #[test]
    fn load_absent_key_is_empty() {
        assert!(load_todos(&InMemoryStorage::new()).is_empty());
    }

    #[test]
    fn load_unreadable_storage_is_empty() {
        assert!(load_todos(&FailingStorage).is_empty());
    }

    #[test]
    fn load_malformed_values_are_empty() {
        for raw in ["", "not json", "{}", r#"[{"id":1,"text":"x","completed":false}]"#, "null"] {
            let storage = InMemoryStorage::with_entry(STORAGE_KEY, raw);
            assert!(load_todos(&storage).is_empty(), "expected empty for {raw:?}");
        }
    }

    #[test]
    fn load_reads_records_written_by_the_desktop_app() {
        let raw = concat!(
            r#"[{"id":"1718000000000","text":"Buy milk","completed":false},"#,
            r#"{"id":"1718000000001","text":"Walk dog","completed":true}]"#,
        );
        let storage = InMemoryStorage::with_entry(STORAGE_KEY, raw);

        let todos = load_todos(&storage);
        assert_eq!(
            todos,
            vec![
                item("1718000000000", "Buy milk", false),
                item("1718000000001", "Walk dog", true),
            ]
        );
    }

    #[test]
    fn load_drops_blank_and_duplicate_records() {
        let raw = r#"[
            {"id":"a","text":"  first  ","completed":false},
            {"id":"b","text":"   ","completed":false},
            {"id":"a","text":"again","completed":true},
            {"id":"c","text":"third","completed":true}
        ]"#;
        let storage = InMemoryStorage::with_entry(STORAGE_KEY, raw);

        assert_eq!(
            load_todos(&storage),
            vec![item("a", "first", false), item("c", "third", true)]
        );
    }

    #[test]
    fn encode_then_load_round_trips() {
        let todos = vec![
            item("x", "One", false),
            item("y", "Two", true),
            item("z", "Three", false),
        ];
        let storage = InMemoryStorage::with_entry(STORAGE_KEY, &encode(&todos).unwrap());
        assert_eq!(load_todos(&storage), todos);
    }

    #[test]
    fn save_effect_writes_and_reports_success() {
        let memory = Arc::new(InMemoryStorage::new());
        let storage: Arc<dyn KeyValueStorage> = memory.clone();
        let clock: Arc<dyn Clock> = Arc::new(test_clock());
        let todos = vec![item("x", "One", false)];

        let actions = run_effects([save_effect(&todos, &storage, &clock)]);

        assert_eq!(actions, vec![TodoAction::Persisted { at: test_clock().now() }]);
        assert_eq!(memory.write_count(), 1);
        assert_eq!(
            memory.raw(STORAGE_KEY).as_deref(),
            Some(r#"[{"id":"x","text":"One","completed":false}]"#)
        );
    }

    #[test]
    fn save_effect_reports_failure() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(FailingStorage);
        let clock: Arc<dyn Clock> = Arc::new(test_clock());

        let actions = run_effects([save_effect(&[], &storage, &clock)]);

        assert!(matches!(
            actions.as_slice(),
            [TodoAction::PersistFailed { error }] if error.contains("quota")
        ));
    }
}
