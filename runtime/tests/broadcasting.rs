//! Integration tests for the Store
//!
//! Covers write-through ordering, follow-up action dispatch, state
//! broadcasting to subscribers and serialization of concurrent senders.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use food_order_core::{effect::Effect, persistence::StatePersistence, reducer::Reducer, smallvec, SmallVec};
use food_order_runtime::{Store, StoreConfig, StoreError};
use food_order_testing::RecordingPersistence;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone)]
enum TestAction {
    /// Add one to the counter
    Increment,
    /// Subtract one, resetting instead of going below one
    Decrement,
    /// Set the counter back to zero
    Reset,
    /// Does nothing
    Ignore,
    /// Keeps dispatching itself
    Loop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TestState {
    counter: u32,
}

#[derive(Clone)]
struct TestEnvironment;

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Increment => {
                state.counter += 1;
                smallvec![Effect::write_through()]
            },
            TestAction::Decrement if state.counter <= 1 => {
                smallvec![Effect::dispatch(TestAction::Reset)]
            },
            TestAction::Decrement => {
                state.counter -= 1;
                smallvec![Effect::write_through()]
            },
            TestAction::Reset => {
                state.counter = 0;
                smallvec![Effect::write_through()]
            },
            TestAction::Ignore => SmallVec::new(),
            TestAction::Loop => smallvec![Effect::dispatch(TestAction::Loop)],
        }
    }
}

/// Persistence that records, alongside every write, how many snapshots were
/// waiting in a subscriber's queue when the write happened.
#[derive(Default)]
struct OrderingPersistence {
    observer: Mutex<Option<broadcast::Receiver<TestState>>>,
    seen: Mutex<Vec<(u32, usize)>>,
}

impl StatePersistence<TestState> for OrderingPersistence {
    fn restore(&self) -> TestState {
        TestState::default()
    }

    fn persist(&self, state: &TestState) {
        let queued = self.observer.lock().as_ref().map_or(0, broadcast::Receiver::len);
        self.seen.lock().push((state.counter, queued));
    }
}

fn new_store(initial: TestState) -> (Store<TestState, TestAction, TestEnvironment, TestReducer>, Arc<RecordingPersistence<TestState>>) {
    let persistence = Arc::new(RecordingPersistence::new(initial));
    let store = Store::new(TestReducer, TestEnvironment, persistence.clone());
    (store, persistence)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_initial_state_is_restored_from_persistence() {
    let (store, persistence) = new_store(TestState { counter: 41 });

    assert_eq!(store.state(|s| s.counter), 41);
    assert_eq!(persistence.writes(), 0);
}

#[test]
fn test_effective_action_writes_through() {
    let (store, persistence) = new_store(TestState::default());

    store.send(TestAction::Increment).unwrap();
    store.send(TestAction::Increment).unwrap();

    assert_eq!(store.state(|s| s.counter), 2);
    assert_eq!(persistence.writes(), 2);
    assert_eq!(persistence.current(), TestState { counter: 2 });
}

#[test]
fn test_noop_action_neither_persists_nor_notifies() {
    let (store, persistence) = new_store(TestState { counter: 3 });
    let mut changes = store.subscribe();

    store.send(TestAction::Ignore).unwrap();

    assert_eq!(persistence.writes(), 0);
    assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_dispatched_follow_up_is_processed_in_the_same_send() {
    let (store, persistence) = new_store(TestState { counter: 1 });

    store.send(TestAction::Decrement).unwrap();

    assert_eq!(store.state(|s| s.counter), 0);
    assert_eq!(persistence.history(), vec![TestState { counter: 0 }]);
}

#[test]
fn test_runaway_dispatch_chain_is_cut_off() {
    let persistence = Arc::new(RecordingPersistence::new(TestState::default()));
    let store = Store::with_config(
        TestReducer,
        TestEnvironment,
        persistence,
        StoreConfig::default().with_max_dispatch_depth(3),
    );

    let result = store.send(TestAction::Loop);

    assert_eq!(result, Err(StoreError::DispatchDepthExceeded(3)));
    // The store stays usable
    store.send(TestAction::Increment).unwrap();
    assert_eq!(store.state(|s| s.counter), 1);
}

#[test]
fn test_subscribers_receive_snapshots_in_send_order() {
    let (store, _persistence) = new_store(TestState::default());
    let mut changes = store.subscribe();

    store.send(TestAction::Increment).unwrap();
    store.send(TestAction::Increment).unwrap();
    store.send(TestAction::Decrement).unwrap();

    let received: Vec<u32> = std::iter::from_fn(|| changes.try_recv().ok())
        .map(|s| s.counter)
        .collect();
    assert_eq!(received, vec![1, 2, 1]);
}

#[tokio::test]
async fn test_subscriber_is_woken_by_a_send_from_another_task() {
    let (store, _persistence) = new_store(TestState::default());
    let mut changes = store.subscribe();

    let sender = store.clone();
    let handle = tokio::spawn(async move {
        sender.send(TestAction::Increment).unwrap();
    });

    let snapshot = changes.recv().await.unwrap();
    assert_eq!(snapshot.counter, 1);
    handle.await.unwrap();
}

#[test]
fn test_persist_happens_before_notify() {
    let persistence = Arc::new(OrderingPersistence::default());
    let store = Store::new(TestReducer, TestEnvironment, persistence.clone());
    *persistence.observer.lock() = Some(store.subscribe());

    for _ in 0..3 {
        store.send(TestAction::Increment).unwrap();
    }

    // When send N persists, only the N-1 earlier snapshots have been published
    assert_eq!(*persistence.seen.lock(), vec![(1, 0), (2, 1), (3, 2)]);
    let queued = persistence.observer.lock().as_ref().map_or(0, broadcast::Receiver::len);
    assert_eq!(queued, 3);
}

#[test]
fn test_concurrent_senders_are_serialized() {
    let (store, persistence) = new_store(TestState::default());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    store.send(TestAction::Increment).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.state(|s| s.counter), 200);
    // Writes are totally ordered: each one is exactly one more than the last
    let history: Vec<u32> = persistence.history().iter().map(|s| s.counter).collect();
    assert_eq!(history, (1..=200).collect::<Vec<_>>());
}
