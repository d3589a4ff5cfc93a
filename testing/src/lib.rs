//! # Food Order Testing
//!
//! Testing utilities and helpers for the food-order architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clocks)
//! - An in-memory, call-recording [`StatePersistence`] implementation
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use food_order_testing::{test_clock, RecordingPersistence};
//! use food_order_runtime::Store;
//!
//! #[test]
//! fn test_cart_flow() {
//!     let persistence = Arc::new(RecordingPersistence::new(CartState::default()));
//!     let store = Store::new(CartReducer::new(), env(test_clock()), persistence.clone());
//!
//!     store.send(CartAction::ClearCart).unwrap();
//!     assert_eq!(persistence.writes(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use food_order_core::environment::Clock;
use food_order_core::persistence::StatePersistence;


/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, StatePersistence, Utc};
    use parking_lot::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use food_order_testing::mocks::FixedClock;
    /// use food_order_core::environment::Clock;
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

    /// Clock that only moves when told to
    ///
    /// Useful when a test needs to observe that a timestamp was refreshed.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock starting at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock();
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_time())
    }

    /// The instant [`test_clock`] is frozen at
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// In-memory persistence that records every write
    ///
    /// `restore` hands out the seeded state; every `persist` overwrites it and
    /// is appended to the write log so tests can assert on write-through.
    #[derive(Debug)]
    pub struct RecordingPersistence<S> {
        current: Mutex<S>,
        log: Mutex<Vec<S>>,
    }

    impl<S: Clone> RecordingPersistence<S> {
        /// Seed the persisted copy with `state`
        #[must_use]
        pub fn new(state: S) -> Self {
            Self {
                current: Mutex::new(state),
                log: Mutex::new(Vec::new()),
            }
        }

        /// Number of `persist` calls so far
        #[must_use]
        pub fn writes(&self) -> usize {
            self.log.lock().len()
        }

        /// Every persisted state, oldest first
        #[must_use]
        pub fn history(&self) -> Vec<S> {
            self.log.lock().clone()
        }

        /// The currently persisted state
        #[must_use]
        pub fn current(&self) -> S {
            self.current.lock().clone()
        }
    }

    impl<S: Clone + Send> StatePersistence<S> for RecordingPersistence<S> {
        fn restore(&self) -> S {
            self.current.lock().clone()
        }

        fn persist(&self, state: &S) {
            *self.current.lock() = state.clone();
            self.log.lock().push(state.clone());
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, RecordingPersistence, test_clock, test_time};
pub use reducer_test::{ReducerTest, assertions};
