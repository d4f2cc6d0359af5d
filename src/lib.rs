//! Calview -- client-side session view engine for multi-detector
//! calibration runs.
//!
//! Keeps a live view of a long-running calibration session consistent with
//! the authoritative state reported by a remote controller over a push
//! channel (WebSocket events) and a pull channel (REST requests), without
//! redundant heavy fetches and without losing recent log history.
//!
//! This crate is a facade over the workspace members:
//!
//! - [`types`]: shared data model, configuration, and errors
//! - [`engine`]: buffers, snapshot reconciliation, session state, history
//! - [`transport`]: channels, wire decoding, and the runner loop

pub use calview_engine as engine;
pub use calview_transport as transport;
pub use calview_types as types;

pub use calview_engine::{
    ActionHistory, LogBuffer, NullSink, PullResponse, PullSource, PullTarget, PushEvent,
    ReconcileQueue, RequestIssuer, SessionEngine, SessionStateMachine, ViewSink, snapshot_diff,
};
pub use calview_transport::{
    ChannelError, HttpPullClient, PushChannel, RunEnd, SessionEndpoints, WsPushChannel,
};
pub use calview_types::{
    ActionEntry, ActionRequest, ActionStatus, CalviewError, DetectorAggregate, EngineConfig,
    LogEntry, LogStream, ProgressSnapshot, RetryPolicy, SessionState, StatusCode,
};
