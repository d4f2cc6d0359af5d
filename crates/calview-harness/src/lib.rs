//! Test harness for Calview: mocks and fixtures.
//!
//! Provides lightweight, thread-safe test doubles for the transport seams:
//!
//! - [`MockPushChannel`]: scripted push event sequences, records submissions
//! - [`MockPullChannel`]: scripted pull responses with failure injection and
//!   per-target hit counters
//! - [`RecordingSink`]: records every engine effect in order
//!
//! All mocks use `Arc<Mutex<_>>` for thread-safe interior mutability, so
//! they can be shared across async tasks safely.

pub mod fixtures;
pub mod mocks;

pub use mocks::{MockPushChannel, MockPullChannel, RecordingSink, SinkEvent, SubmissionLog};
