//! # todo-desk Testing
//!
//! Testing utilities and helpers for the todo-desk architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers and a synchronous effect runner
//!
//! ## Example
//!
//! ```ignore
//! use todo_desk_testing::{mocks::InMemoryStorage, test_clock, SequentialIdGenerator};
//!
//! let storage = Arc::new(InMemoryStorage::new());
//! let env = TodoEnvironment::new(Arc::new(test_clock()), Arc::new(SequentialIdGenerator::new()), storage.clone());
//! let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//! store.send(TodoAction::AddTodo { text: "Buy milk".into() }).await?;
//! assert_eq!(storage.write_count(), 1);
//! ```

mod reducer_test;

pub use reducer_test::{ReducerTest, assertions, run_effects};

use chrono::{DateTime, Utc};
use todo_desk_core::environment::{Clock, IdGenerator};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use todo_desk_core::storage::{KeyValueStorage, Result, StorageError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todo_desk_testing::mocks::FixedClock;
    /// use todo_desk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable identifiers: `todo-1`, `todo-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start counting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("todo-{n}")
        }
    }

    /// Generator that hands out the same identifier forever
    ///
    /// Used to exercise collision handling in callers.
    #[derive(Debug, Clone)]
    pub struct StuckIdGenerator(pub String);

    impl IdGenerator for StuckIdGenerator {
        fn next_id(&self) -> String {
            self.0.clone()
        }
    }

    /// In-memory key-value store that counts writes
    #[derive(Debug, Default)]
    pub struct InMemoryStorage {
        entries: Mutex<HashMap<String, String>>,
        writes: AtomicUsize,
    }

    impl InMemoryStorage {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store with one key already populated
        #[must_use]
        pub fn with_entry(key: &str, value: &str) -> Self {
            let storage = Self::new();
            storage
                .entries
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(key.to_string(), value.to_string());
            storage
        }

        /// Current raw value for `key`, bypassing the trait
        #[must_use]
        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .get(key)
                .cloned()
        }

        /// Number of successful `set` calls
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStorage for InMemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.raw(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.entries
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store whose reads and writes always fail
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StorageError::Io(std::io::Error::other("storage unavailable")))
        }

        fn set(&self, _key: &str, value: &str) -> Result<()> {
            Err(StorageError::QuotaExceeded {
                size: value.len(),
                limit: 0,
            })
        }
    }
}

// Re-export commonly used items
pub use mocks::{
    FailingStorage, FixedClock, InMemoryStorage, SequentialIdGenerator, StuckIdGenerator,
    test_clock,
};
