//! Tests for #[derive(Action)] macro

use chrono::{DateTime, Utc};
use todo_desk_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum ListAction {
    #[command]
    AddEntry { text: String },

    #[command]
    ClearAll,

    #[command]
    Rename(String),

    #[event]
    Saved { at: DateTime<Utc> },

    #[event]
    SaveFailed(String),

    Tick,
}

#[test]
fn test_is_command() {
    let action = ListAction::AddEntry {
        text: "Test".to_string(),
    };
    assert!(action.is_command());
    assert!(!action.is_event());
}

#[test]
fn test_is_event() {
    let action = ListAction::Saved { at: Utc::now() };
    assert!(!action.is_command());
    assert!(action.is_event());
}

#[test]
fn test_unit_and_tuple_variants() {
    assert!(ListAction::ClearAll.is_command());
    assert!(ListAction::Rename("x".to_string()).is_command());
    assert!(ListAction::SaveFailed("disk full".to_string()).is_event());
}

#[test]
fn test_unmarked_variant_is_neither() {
    let action = ListAction::Tick;
    assert!(!action.is_command());
    assert!(!action.is_event());
}

#[test]
fn test_names() {
    let cases = vec![
        (
            ListAction::AddEntry {
                text: "Test".to_string(),
            },
            "AddEntry",
        ),
        (ListAction::ClearAll, "ClearAll"),
        (ListAction::Rename("New".to_string()), "Rename"),
        (ListAction::Saved { at: Utc::now() }, "Saved"),
        (ListAction::SaveFailed("nope".to_string()), "SaveFailed"),
        (ListAction::Tick, "Tick"),
    ];

    for (action, expected) in cases {
        assert_eq!(action.name(), expected);
    }
}
