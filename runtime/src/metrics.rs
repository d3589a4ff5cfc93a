//! Metrics recorded by the Store.
//!
//! The store emits through the `metrics` facade, so nothing is recorded
//! unless the host application installs a recorder. Call
//! [`register_metrics`] once after installing one to attach descriptions.

use metrics::{describe_counter, describe_histogram};

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Actions processed by a store, labelled by outcome (`effective` or `noop`)
pub const ACTIONS_TOTAL: &str = "store_actions_total";

/// Write-through operations executed
pub const PERSIST_TOTAL: &str = "store_persist_total";

/// State snapshots published to observers
pub const NOTIFY_TOTAL: &str = "store_notify_total";

/// Time spent inside the reducer
pub const REDUCER_DURATION_SECONDS: &str = "store_reducer_duration_seconds";

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        ACTIONS_TOTAL,
        "Total number of actions processed by the store"
    );
    describe_counter!(
        PERSIST_TOTAL,
        "Total number of state write-throughs to persistence"
    );
    describe_counter!(
        NOTIFY_TOTAL,
        "Total number of state snapshots published to observers"
    );
    describe_histogram!(
        REDUCER_DURATION_SECONDS,
        "Time taken by the reducer to process one action"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_without_recorder_is_harmless() {
        register_metrics();
        counter!(ACTIONS_TOTAL, "outcome" => "noop").increment(1);
    }
}
