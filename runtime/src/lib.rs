//! # todo-desk Runtime
//!
//! Runtime implementation for the todo-desk architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Runs effect descriptions to completion and feeds actions back to the reducer
//! - **Change notification**: A watch channel observers use to refresh views
//!
//! ## Example
//!
//! ```ignore
//! use todo_desk_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; effects and feedback actions finish before this returns
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::collections::VecDeque;
use todo_desk_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{Mutex, RwLock, watch};

/// Upper bound on actions processed by a single `send`, counting the
/// initial action and every action fed back by its effects.
pub const MAX_ACTIONS_PER_SEND: usize = 64;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept producing actions past the per-send limit
        ///
        /// State changes made before the limit was hit are kept; the
        /// remaining queued actions are dropped.
        #[error("Feedback loop exceeded {limit} actions in a single send")]
        FeedbackLimitExceeded {
            /// The limit that was hit
            limit: usize,
        },
    }
}

pub use error::StoreError;

/// Store module - the runtime coordinator
pub mod store {
    use super::{
        Effect, MAX_ACTIONS_PER_SEND, Mutex, Reducer, RwLock, StoreError, VecDeque, watch,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` so views can read while no action is running)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Actions are processed one at a time. A call to [`Store::send`] holds
    /// the dispatch lock until the action, all of its effects, and every
    /// action those effects feed back have been processed.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<S>,
        reducer: R,
        environment: E,
        dispatch: Mutex<()>,
        /// Bumped once per completed `send`; observers watch it to refresh.
        revision: watch::Sender<u64>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync,
        A: Send + 'static,
        S: Send + Sync,
        E: Send + Sync,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (revision, _) = watch::channel(0);

            Self {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                dispatch: Mutex::new(()),
                revision,
            }
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Send an action to the store
        ///
        /// 1. Waits for any in-flight `send` to finish
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects in order, awaiting each
        /// 4. Actions produced by effects are reduced the same way
        /// 5. Notifies subscribers once the queue is empty
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] if more than
        /// [`MAX_ACTIONS_PER_SEND`] actions would be processed.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let _turn = self.dispatch.lock().await;

            let mut pending = VecDeque::from([action]);
            let mut processed = 0_usize;
            let mut outcome = Ok(());

            while let Some(action) = pending.pop_front() {
                if processed == MAX_ACTIONS_PER_SEND {
                    tracing::error!(
                        limit = MAX_ACTIONS_PER_SEND,
                        dropped = pending.len() + 1,
                        "Feedback loop limit reached, dropping queued actions"
                    );
                    metrics::counter!("store.actions.dropped").increment(1);
                    outcome = Err(StoreError::FeedbackLimitExceeded {
                        limit: MAX_ACTIONS_PER_SEND,
                    });
                    break;
                }
                processed += 1;

                metrics::counter!("store.actions.total").increment(1);

                let effects = {
                    let mut state = self.state.write().await;
                    tracing::trace!("Acquired write lock on state");

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                    metrics::histogram!("store.reducer.duration_seconds")
                        .record(start.elapsed().as_secs_f64());

                    effects
                };

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                execute_effects(effects, &mut pending).await;
            }

            tracing::debug!(actions = processed, "Action processing completed");
            self.revision.send_modify(|revision| *revision += 1);

            outcome
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to change notifications
        ///
        /// The receiver observes a counter that increases after every
        /// completed [`Store::send`]. Call `changed().await` on it and then
        /// read state to refresh a view.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<u64> {
            self.revision.subscribe()
        }

        /// Number of completed sends so far
        #[must_use]
        pub fn revision(&self) -> u64 {
            *self.revision.borrow()
        }
    }

    /// Run effects to completion in order, queueing produced actions
    async fn execute_effects<A>(
        effects: impl IntoIterator<Item = Effect<A>>,
        feedback: &mut VecDeque<A>,
    ) {
        let mut queue: VecDeque<Effect<A>> = effects.into_iter().collect();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Sequential(inner) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    for effect in inner.into_iter().rev() {
                        queue.push_front(effect);
                    }
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, feeding back");
                        feedback.push_back(action);
                    }
                },
            }
        }
    }
}

pub use store::Store;
