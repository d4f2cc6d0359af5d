//! The session context: one explicitly constructed object owning all
//! mutable client state for one calibration session.
//!
//! Components receive the context (or the slice they need) by reference
//! from the composition root; nothing in the engine lives in a global.
//! Every operation is idempotent with respect to redundant delivery, since
//! the push and pull channels can race.

use calview_types::{EngineConfig, LogEntry, LogStream, SessionState};

use crate::event::PushEvent;
use crate::history::ActionHistory;
use crate::logbuf::LogBuffer;
use crate::reconcile::ReconcileQueue;
use crate::session::SessionStateMachine;
use crate::sink::ViewSink;

/// Owns the buffers, the reconciliation queue, the state machine, and the
/// action history of one session. All mutation flows through its methods.
pub struct SessionEngine {
    config: EngineConfig,
    monitor_log: LogBuffer,
    command_log: LogBuffer,
    reconcile: ReconcileQueue,
    session: SessionStateMachine,
    history: ActionHistory,
}

impl SessionEngine {
    /// Build a fresh engine from constructor-time configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            monitor_log: LogBuffer::new(config.monitor_log_capacity),
            command_log: LogBuffer::new(config.command_log_capacity),
            reconcile: ReconcileQueue::new(),
            session: SessionStateMachine::new(),
            history: ActionHistory::new(),
            config,
        }
    }

    /// Route one normalized event to the component that owns its state.
    pub fn handle_event(&mut self, event: PushEvent, sink: &dyn ViewSink) {
        match event {
            PushEvent::Log { stream, entry } => {
                self.buffer_mut(stream).append(entry);
                sink.log_appended(stream);
            }
            PushEvent::Progress(snapshot) => self.reconcile.enqueue(snapshot, sink),
            PushEvent::State(state) => self.session.apply_report(state, sink),
            PushEvent::ActionStatus(report) => self.history.apply(report, sink),
            PushEvent::SessionReset => self.reset(sink),
        }
    }

    /// Apply a bulk history dump pulled on (re)connect.
    pub fn apply_log_dump(
        &mut self,
        stream: LogStream,
        entries: Vec<LogEntry>,
        sink: &dyn ViewSink,
    ) {
        self.buffer_mut(stream).append_bulk(entries);
        sink.log_appended(stream);
    }

    /// Apply a session state pulled from the status endpoint. Same effect
    /// as a pushed state report.
    pub fn apply_state(&mut self, state: SessionState, sink: &dyn ViewSink) {
        self.session.apply_report(state, sink);
    }

    /// Deliver a resolved prompt pull; dropped if stale.
    pub fn apply_prompt(&self, epoch: u64, text: &str, sink: &dyn ViewSink) -> bool {
        self.session.apply_prompt(epoch, text, sink)
    }

    /// Record that an action was just submitted (optimistic input disable).
    pub fn note_submission(&mut self, sink: &dyn ViewSink) {
        self.session.note_submission(sink);
    }

    /// Drop all session state: buffers, queued and applied snapshots,
    /// action history, and the known session state.
    pub fn reset(&mut self, sink: &dyn ViewSink) {
        self.monitor_log.clear();
        self.command_log.clear();
        self.reconcile.reset();
        self.history.clear();
        self.session.reset(sink);
    }

    fn buffer_mut(&mut self, stream: LogStream) -> &mut LogBuffer {
        match stream {
            LogStream::Monitor => &mut self.monitor_log,
            LogStream::Command => &mut self.command_log,
        }
    }

    /// The buffer for one stream.
    pub fn buffer(&self, stream: LogStream) -> &LogBuffer {
        match stream {
            LogStream::Monitor => &self.monitor_log,
            LogStream::Command => &self.command_log,
        }
    }

    /// The reconciliation queue (status table + aggregates).
    pub fn reconcile(&self) -> &ReconcileQueue {
        &self.reconcile
    }

    /// The session state machine.
    pub fn session(&self) -> &SessionStateMachine {
        &self.session
    }

    /// The action history.
    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    /// The constructor-time configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
