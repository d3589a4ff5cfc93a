//! # Food Order Runtime
//!
//! Runtime implementation for the food-order architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state, runs the reducer and executes effects
//! - **Effect Executor**: Writes state through to persistence, publishes
//!   snapshots to observers and feeds follow-up actions back to the reducer
//!
//! ## Execution Model
//!
//! `send` is synchronous. The state lives behind a single mutex which is held
//! for the whole `action → reducer → effects → follow-up actions` cycle, so two
//! sends can never interleave, even when the store is shared across threads.
//!
//! ## Example
//!
//! ```ignore
//! use food_order_runtime::Store;
//!
//! let store = Store::new(my_reducer, environment, Arc::new(persistence));
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//!
//! // Observe state changes
//! let mut changes = store.subscribe();
//! ```

use food_order_core::{effect::Effect, persistence::StatePersistence, reducer::Reducer};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

/// Metric names and descriptions for the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A chain of `Effect::Dispatch` follow-up actions went deeper than allowed
        ///
        /// This points at a reducer that keeps dispatching to itself. Actions
        /// already reduced keep their effects; the remaining follow-ups are dropped.
        #[error("Follow-up action chain exceeded the maximum depth of {0}")]
        DispatchDepthExceeded(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store behavior
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default().with_broadcast_capacity(64);
/// let store = Store::with_config(reducer, env, persistence, config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of state snapshots buffered per subscriber before it lags
    pub broadcast_capacity: usize,
    /// Maximum length of a chain of `Effect::Dispatch` follow-up actions
    pub max_dispatch_depth: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, max_dispatch_depth: usize) -> Self {
        Self {
            broadcast_capacity,
            max_dispatch_depth,
        }
    }

    /// Set the subscriber buffer size
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the maximum follow-up chain length
    #[must_use]
    pub const fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            max_dispatch_depth: 8,
        }
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, Effect, Instant, Mutex, Reducer, StatePersistence, StoreConfig, StoreError,
        VecDeque, broadcast, metrics,
    };

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind one `Mutex`, so mutations are totally ordered)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Persistence (restored once at construction, written through on `Effect::Persist`)
    /// 5. Observers (a broadcast channel fed on `Effect::Notify`)
    ///
    /// Cloning a store is cheap and yields another handle to the same state.
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
        state: Arc<Mutex<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        persistence: Arc<dyn StatePersistence<S>>,
        config: StoreConfig,
        /// State snapshots published after every effective mutation.
        changes: broadcast::Sender<S>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: Clone + Send + 'static,
        A: std::fmt::Debug,
    {
        /// Create a new Store, restoring its initial state from `persistence`
        #[must_use]
        pub fn new(reducer: R, environment: E, persistence: Arc<dyn StatePersistence<S>>) -> Self {
            Self::with_config(reducer, environment, persistence, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            reducer: R,
            environment: E,
            persistence: Arc<dyn StatePersistence<S>>,
            config: StoreConfig,
        ) -> Self {
            let initial_state = persistence.restore();
            let (changes, _) = broadcast::channel(config.broadcast_capacity.max(1));
            tracing::debug!(?config, "Store created from persisted state");

            Self {
                state: Arc::new(Mutex::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                persistence,
                config,
                changes,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer and executes the returned effects in order before
        /// returning. Follow-up actions produced by `Effect::Dispatch` are
        /// processed FIFO within the same call, under the same lock.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::DispatchDepthExceeded`] if follow-up actions
        /// keep dispatching past `max_dispatch_depth`.
        pub fn send(&self, action: A) -> Result<(), StoreError> {
            let mut state = self.state.lock();
            let mut queue = VecDeque::from([(action, 0_usize)]);

            while let Some((action, depth)) = queue.pop_front() {
                if depth > self.config.max_dispatch_depth {
                    tracing::error!(
                        depth,
                        dropped = queue.len() + 1,
                        "Follow-up action chain too deep, dropping remaining actions"
                    );
                    return Err(StoreError::DispatchDepthExceeded(
                        self.config.max_dispatch_depth,
                    ));
                }

                tracing::trace!(?action, depth, "Reducing action");
                let start = Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!(metrics::REDUCER_DURATION_SECONDS)
                    .record(start.elapsed().as_secs_f64());

                let outcome = if effects.iter().any(|e| !matches!(e, Effect::None)) {
                    "effective"
                } else {
                    "noop"
                };
                metrics::counter!(metrics::ACTIONS_TOTAL, "outcome" => outcome).increment(1);
                tracing::trace!(effects = effects.len(), outcome, "Reducer completed");

                for effect in effects {
                    self.execute_effect(effect, &*state, &mut queue, depth);
                }
            }

            Ok(())
        }

        fn execute_effect(
            &self,
            effect: Effect<A>,
            state: &S,
            queue: &mut VecDeque<(A, usize)>,
            depth: usize,
        ) {
            match effect {
                Effect::None => {},
                Effect::Sequential(effects) => {
                    for effect in effects {
                        self.execute_effect(effect, state, queue, depth);
                    }
                },
                Effect::Dispatch(action) => {
                    tracing::trace!(?action, "Queueing follow-up action");
                    queue.push_back((*action, depth + 1));
                },
                Effect::Persist => {
                    self.persistence.persist(state);
                    metrics::counter!(metrics::PERSIST_TOTAL).increment(1);
                },
                Effect::Notify => {
                    // No subscribers is not an error
                    let receivers = self.changes.send(state.clone()).unwrap_or(0);
                    metrics::counter!(metrics::NOTIFY_TOTAL).increment(1);
                    tracing::trace!(receivers, "Published state snapshot");
                },
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let item_count = store.state(|s| s.total_items());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.lock();
            f(&state)
        }

        /// Subscribe to state changes
        ///
        /// The receiver gets one snapshot per `Effect::Notify`, in the order
        /// the mutations happened. A receiver that falls more than
        /// `broadcast_capacity` snapshots behind observes
        /// `RecvError::Lagged` and then continues from the oldest buffered one.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<S> {
            self.changes.subscribe()
        }

        /// Number of live subscribers
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.changes.receiver_count()
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> StoreConfig {
            self.config
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                persistence: Arc::clone(&self.persistence),
                config: self.config,
                changes: self.changes.clone(),
            }
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_builders() {
        let config = StoreConfig::default()
            .with_broadcast_capacity(64)
            .with_max_dispatch_depth(2);
        assert_eq!(config, StoreConfig::new(64, 2));
    }

    #[test]
    fn dispatch_depth_error_message() {
        let error = StoreError::DispatchDepthExceeded(8);
        assert_eq!(
            error.to_string(),
            "Follow-up action chain exceeded the maximum depth of 8"
        );
    }
}
