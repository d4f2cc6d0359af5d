//! Shared helpers for the workspace integration tests.

use calview::{EngineConfig, RetryPolicy, SessionEngine};
use calview_harness::RecordingSink;

/// An engine with small buffers and fast retries, suitable for tests.
pub fn test_engine() -> SessionEngine {
    SessionEngine::new(test_config())
}

/// The configuration used by [`test_engine`].
pub fn test_config() -> EngineConfig {
    EngineConfig {
        monitor_log_capacity: 10,
        command_log_capacity: 5,
        retry: RetryPolicy {
            interval_ms: 500,
            max_attempts: 2,
        },
        poll_interval_ms: 60_000,
        refetch_delay_ms: 1_000,
    }
}

/// A fresh recording sink.
pub fn sink() -> RecordingSink {
    RecordingSink::new()
}
