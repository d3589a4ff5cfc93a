//! # Food Order Core
//!
//! Core traits and types for the food-order client architecture.
//!
//! This crate provides the abstractions every feature is built from:
//!
//! - **State**: Owned domain state for a feature (e.g. the shopping cart)
//! - **Action**: All possible inputs to a reducer
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (write-through, observer notification, follow-up actions)
//! - **Environment**: Injected dependencies via traits
//! - **Persistence**: The seam through which a store restores and writes through its state
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (reducers never touch storage or observers directly)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use food_order_core::*;
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         smallvec![Effect::write_through()]
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CartReducer {
    ///     type State = CartState;
    ///     type Action = CartAction;
    ///     type Environment = CartEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CartState,
    ///         action: CartAction,
    ///         env: &CartEnvironment,
    ///     ) -> SmallVec<[Effect<CartAction>; 4]> {
    ///         match action {
    ///             CartAction::ClearCart => {
    ///                 state.cart = None;
    ///                 smallvec![Effect::write_through()]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Checks the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed by the store
        ///
        /// An empty effect list means the action was a no-op: the store
        /// neither persists nor notifies.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the store.
/// They are values (not execution), so reducers stay pure and testable.
pub mod effect {
    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime, in order, while the
    /// store still holds its state lock.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can feed back into the reducer
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects one after the other, in order
        Sequential(Vec<Effect<Action>>),

        /// Feed a follow-up action back into the reducer.
        ///
        /// The action is processed within the same `send`, before the
        /// store releases its lock, so no other action can interleave.
        Dispatch(Box<Action>),

        /// Write the current state through to the store's persistence
        Persist,

        /// Publish the current state to every subscriber
        Notify,
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Dispatch(action) => {
                    f.debug_tuple("Effect::Dispatch").field(action).finish()
                },
                Effect::Persist => write!(f, "Effect::Persist"),
                Effect::Notify => write!(f, "Effect::Notify"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Persist the new state, then notify observers.
        ///
        /// This is the effect every effective mutation ends with.
        #[must_use]
        pub fn write_through() -> Effect<Action> {
            Effect::Sequential(vec![Effect::Persist, Effect::Notify])
        }

        /// Feed `action` back into the reducer
        #[must_use]
        pub fn dispatch(action: Action) -> Effect<Action> {
            Effect::Dispatch(Box::new(action))
        }

        /// Returns `true` if this effect (or any nested effect) persists state
        #[must_use]
        pub fn persists(&self) -> bool {
            match self {
                Effect::Persist => true,
                Effect::Sequential(effects) => effects.iter().any(Effect::persists),
                Effect::None | Effect::Dispatch(_) | Effect::Notify => false,
            }
        }

        /// Returns `true` if this effect (or any nested effect) notifies observers
        #[must_use]
        pub fn notifies(&self) -> bool {
            match self {
                Effect::Notify => true,
                Effect::Sequential(effects) => effects.iter().any(Effect::notifies),
                Effect::None | Effect::Dispatch(_) | Effect::Persist => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// let clock = SystemClock;
    ///
    /// // Test - fixed time for deterministic tests
    /// let clock = FixedClock::new(time);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

/// Persistence module - durable copy of a store's state
///
/// A store restores its initial state from persistence exactly once, at
/// construction, and writes through on every [`effect::Effect::Persist`].
pub mod persistence {
    /// Best-effort persistence for a store's state.
    ///
    /// Both operations are infallible by contract: implementations recover
    /// from missing or corrupt data by restoring the default state, and
    /// swallow (and log) write failures. The in-memory state stays
    /// authoritative for the running session.
    pub trait StatePersistence<S>: Send + Sync {
        /// Restore the last persisted state, or the empty state
        fn restore(&self) -> S;

        /// Overwrite the persisted copy with `state`
        fn persist(&self, state: &S);
    }
}
