//! Line-oriented terminal front end.
//!
//! Each input line is one UI gesture. Items are addressed by their
//! 1-based display position; the shell resolves positions to ids before
//! dispatching, so the store only ever sees ids.
//!
//! While an item is in edit mode, the next line is the edit input rather
//! than a command: non-blank text is saved, `/cancel` leaves edit mode,
//! and a blank line changes nothing.

use crate::TodoStore;
use crate::types::{TodoAction, TodoId, TodoState};
use std::fmt::Write as _;
use thiserror::Error;
use todo_desk_runtime::StoreError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Edit-mode line that discards the pending edit
pub const CANCEL_EDIT: &str = "/cancel";

/// Shown for an empty list
pub const EMPTY_MESSAGE: &str = "No todos yet. Add one above!";

/// Command reference printed by `help`
pub const HELP: &str = "\
Commands:
  add <text>    (a)   add a todo
  toggle <n>    (t)   mark todo n done or not done
  delete <n>    (d)   delete todo n
  edit <n>      (e)   edit todo n; type the new text on the next line,
                      or /cancel to keep the old text
  list          (ls)  show the list
  help          (?)   show this help
  quit          (q)   exit
";

/// A parsed shell command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add a todo with the given raw text
    Add(String),
    /// Toggle the todo at a 1-based position
    Toggle(usize),
    /// Delete the todo at a 1-based position
    Delete(usize),
    /// Start editing the todo at a 1-based position
    Edit(usize),
    /// Print the list
    List,
    /// Print the command reference
    Help,
    /// Leave the shell
    Quit,
}

/// Errors from parsing a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first word is not a known command.
    #[error("Unknown command {0:?}, type `help` for a list")]
    Unknown(String),

    /// The command is missing its argument or has a stray one.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// The position is not a positive integer.
    #[error("{0:?} is not a todo number")]
    InvalidPosition(String),
}

/// Errors that end the shell loop.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Reading input or writing output failed.
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The store rejected an action.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse one command line
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands, missing or extra
/// arguments, and positions that are not positive integers.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_lowercase().as_str() {
        "add" | "a" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("add <text>"));
            }
            Command::Add(rest.to_string())
        },
        "toggle" | "t" => Command::Toggle(position(rest, "toggle <n>")?),
        "delete" | "d" => Command::Delete(position(rest, "delete <n>")?),
        "edit" | "e" => Command::Edit(position(rest, "edit <n>")?),
        "list" | "ls" => no_argument(rest, Command::List, "list")?,
        "help" | "?" => no_argument(rest, Command::Help, "help")?,
        "quit" | "q" => no_argument(rest, Command::Quit, "quit")?,
        _ => return Err(ParseError::Unknown(word.to_string())),
    };

    Ok(Some(command))
}

fn position(arg: &str, usage: &'static str) -> Result<usize, ParseError> {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        return Err(ParseError::Usage(usage));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::InvalidPosition(arg.to_string())),
    }
}

fn no_argument(arg: &str, command: Command, usage: &'static str) -> Result<Command, ParseError> {
    if arg.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::Usage(usage))
    }
}

/// Render the list and a status line
#[must_use]
pub fn render(state: &TodoState) -> String {
    let mut out = String::new();

    if state.is_empty() {
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
    }

    for (index, todo) in state.todos.iter().enumerate() {
        let mark = if todo.completed { 'x' } else { ' ' };
        match state.editing.as_ref().filter(|edit| edit.id == todo.id) {
            Some(edit) => {
                let _ = writeln!(out, "{:>3}. [{mark}] {} (editing)", index + 1, edit.buffer);
            },
            None => {
                let _ = writeln!(out, "{:>3}. [{mark}] {}", index + 1, todo.text);
            },
        }
    }

    let _ = write!(out, "{}/{} completed", state.completed_count(), state.count());
    if let Some(at) = state.last_saved_at {
        let _ = write!(out, " | saved {}", at.format("%H:%M:%S"));
    }
    if let Some(error) = &state.last_error {
        let _ = write!(out, " | error: {error}");
    }
    out.push('\n');

    out
}

/// Run the shell until `quit` or end of input
///
/// # Errors
///
/// Returns [`ShellError`] if the terminal cannot be read or written, or
/// if the store rejects an action.
pub async fn run<R, W>(store: &TodoStore, input: R, mut output: W) -> Result<(), ShellError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    let view = store.state(render).await;
    output.write_all(view.as_bytes()).await?;
    output.write_all(b"Type `help` for commands.\n").await?;

    loop {
        let editing = store.state(|s| s.editing.is_some()).await;
        let prompt: &[u8] = if editing { b"edit> " } else { b"> " };
        output.write_all(prompt).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            tracing::debug!("End of input");
            break;
        };

        if editing {
            edit_line(store, &line).await?;
        } else {
            match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(Command::Help)) => {
                    output.write_all(HELP.as_bytes()).await?;
                    continue;
                },
                Ok(Some(command)) => {
                    if let Some(message) = execute(store, command).await? {
                        output.write_all(format!("{message}\n").as_bytes()).await?;
                        continue;
                    }
                },
                Err(error) => {
                    output.write_all(format!("{error}\n").as_bytes()).await?;
                    continue;
                },
            }
        }

        let view = store.state(render).await;
        output.write_all(view.as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}

/// Treat `line` as the edit input
async fn edit_line(store: &TodoStore, line: &str) -> Result<(), StoreError> {
    let trimmed = line.trim();
    if trimmed == CANCEL_EDIT {
        return store.send(TodoAction::CancelEdit).await;
    }
    if trimmed.is_empty() {
        tracing::debug!("Blank edit input, staying in edit mode");
        return Ok(());
    }

    store
        .send(TodoAction::SetEditBuffer {
            text: line.to_string(),
        })
        .await?;
    store.send(TodoAction::CommitEdit).await
}

/// Dispatch a list command; returns a message instead when the command
/// does not apply
async fn execute(store: &TodoStore, command: Command) -> Result<Option<String>, StoreError> {
    let action = match command {
        Command::Add(text) => {
            store.send(TodoAction::SetInput { text: text.clone() }).await?;
            TodoAction::AddTodo { text }
        },
        Command::Toggle(n) => match store.state(|s| id_at(s, n)).await {
            Some(id) => TodoAction::ToggleComplete { id },
            None => return Ok(Some(no_such_todo(n))),
        },
        Command::Delete(n) => match store.state(|s| id_at(s, n)).await {
            Some(id) => TodoAction::DeleteTodo { id },
            None => return Ok(Some(no_such_todo(n))),
        },
        Command::Edit(n) => {
            let target = store
                .state(|s| id_at(s, n).map(|id| (s.get(&id).is_some_and(|t| t.completed), id)))
                .await;
            match target {
                Some((false, id)) => TodoAction::BeginEdit { id },
                Some((true, _)) => {
                    return Ok(Some(format!("Todo {n} is done; toggle it first to edit")));
                },
                None => return Ok(Some(no_such_todo(n))),
            }
        },
        Command::List | Command::Help | Command::Quit => return Ok(None),
    };

    store.send(action).await?;
    Ok(None)
}

fn no_such_todo(position: usize) -> String {
    format!("There is no todo {position}")
}

fn id_at(state: &TodoState, position: usize) -> Option<TodoId> {
    position
        .checked_sub(1)
        .and_then(|index| state.todos.get(index))
        .map(|todo| todo.id.clone())
}
