//! Calview engine -- the client-side state core for a calibration session view.
//!
//! Keeps a local view of a long-running, multi-detector calibration session
//! consistent with the authoritative state reported by a remote controller
//! over two independently timed transport paths (push events and pull
//! requests). The engine owns all mutable session state:
//!
//! - [`LogBuffer`]: bounded FIFO history for the monitor and command logs
//! - [`snapshot_diff`]: pure delta computation between progress snapshots
//! - [`ReconcileQueue`]: single-flight, strictly ordered snapshot application
//! - [`SessionStateMachine`]: controller-driven session state and input gating
//! - [`ActionHistory`]: append-only per-action status timelines
//! - [`RequestIssuer`]: bounded-retry pull request primitive
//! - [`SessionEngine`]: the session context composing all of the above
//!
//! Rendering is out of scope: every display-relevant effect is surfaced
//! through the [`ViewSink`] trait and handled by the embedding application.

pub mod context;
pub mod diff;
pub mod event;
pub mod history;
pub mod issuer;
pub mod logbuf;
pub mod reconcile;
pub mod session;
pub mod sink;

pub use context::SessionEngine;
pub use diff::{snapshot_diff, DirtyKey};
pub use event::{PullResponse, PullTarget, PushEvent};
pub use history::ActionHistory;
pub use issuer::{PullSource, RequestIssuer};
pub use logbuf::LogBuffer;
pub use reconcile::ReconcileQueue;
pub use session::SessionStateMachine;
pub use sink::{NullSink, ViewSink};
