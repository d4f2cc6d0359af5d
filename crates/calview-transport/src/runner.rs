//! The runner event loop.
//!
//! Bridges the two channels and the engine on one logical event loop: a
//! single-threaded tokio runtime driving one `select!` over push events,
//! the periodic status poll, outbound submissions, and cancellation. All
//! engine logic executes here sequentially; suspension happens only at
//! channel boundaries and timed waits.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use calview_engine::{
    PullResponse, PullSource, PullTarget, RequestIssuer, SessionEngine, ViewSink,
};
use calview_types::{
    ActionRequest, DetectorAggregate, EngineConfig, LogEntry, LogStream, SessionState, StatusCode,
};

use crate::channel::{ChannelError, PushChannel};
use crate::http::HttpPullClient;
use crate::ws::WsPushChannel;

/// Cap for the reconnect backoff in [`run_session`].
const MAX_RECONNECT_BACKOFF_SECS: u64 = 30;

/// Why a [`run_loop`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The cancellation token fired; do not reconnect.
    Cancelled,
    /// The push channel shut down; the caller may reconnect.
    ChannelClosed,
}

/// Controller endpoints for one session.
#[derive(Debug, Clone)]
pub struct SessionEndpoints {
    /// WebSocket push endpoint (`ws://...`).
    pub push_url: String,
    /// Base URL of the pull REST surface.
    pub pull_base: url::Url,
}

/// Wraps the embedding's sink, forwarding every effect while capturing the
/// ones the runner itself must service: heavy-payload refetches and prompt
/// pulls. Requests are deduplicated so a pair dirtied by several queued
/// snapshots is fetched once.
struct EffectCapture<'a> {
    inner: &'a dyn ViewSink,
    refetches: Mutex<BTreeSet<(String, String)>>,
    prompt: Mutex<Option<u64>>,
}

impl<'a> EffectCapture<'a> {
    fn new(inner: &'a dyn ViewSink) -> Self {
        Self {
            inner,
            refetches: Mutex::new(BTreeSet::new()),
            prompt: Mutex::new(None),
        }
    }

    fn take_refetches(&self) -> BTreeSet<(String, String)> {
        let mut pending = self.refetches.lock().expect("refetch set lock poisoned");
        std::mem::take(&mut *pending)
    }

    fn take_prompt(&self) -> Option<u64> {
        self.prompt.lock().expect("prompt slot lock poisoned").take()
    }
}

impl ViewSink for EffectCapture<'_> {
    fn log_appended(&self, stream: LogStream) {
        self.inner.log_appended(stream);
    }
    fn status_changed(&self, tag: &str, detector: &str, status: StatusCode) {
        self.inner.status_changed(tag, detector, status);
    }
    fn aggregate_changed(&self, detector: &str, aggregate: DetectorAggregate) {
        self.inner.aggregate_changed(detector, aggregate);
    }
    fn refetch_requested(&self, tag: &str, detector: &str) {
        self.refetches
            .lock()
            .expect("refetch set lock poisoned")
            .insert((tag.to_string(), detector.to_string()));
        self.inner.refetch_requested(tag, detector);
    }
    fn payload_ready(&self, tag: &str, detector: &str, payload: &serde_json::Value) {
        self.inner.payload_ready(tag, detector, payload);
    }
    fn inputs_enabled(&self, enabled: bool) {
        self.inner.inputs_enabled(enabled);
    }
    fn prompt_requested(&self, epoch: u64) {
        // Only the newest epoch matters; an older captured epoch is stale
        // by definition and would be discarded on apply anyway.
        *self.prompt.lock().expect("prompt slot lock poisoned") = Some(epoch);
        self.inner.prompt_requested(epoch);
    }
    fn prompt_shown(&self, text: &str) {
        self.inner.prompt_shown(text);
    }
    fn prompt_hidden(&self) {
        self.inner.prompt_hidden();
    }
    fn session_state_changed(&self, state: SessionState) {
        self.inner.session_state_changed(state);
    }
    fn action_updated(&self, name: &str) {
        self.inner.action_updated(name);
    }
    fn status_unavailable(&self) {
        self.inner.status_unavailable();
    }
    fn diagnostic(&self, entry: &LogEntry) {
        self.inner.diagnostic(entry);
    }
}

/// Run the engine loop on the current thread with a single-threaded tokio
/// runtime. Blocks until cancellation or channel shutdown.
///
/// Call this from a dedicated `std::thread::spawn`.
pub fn run<P: PushChannel>(
    push: P,
    pull: Arc<dyn PullSource>,
    config: EngineConfig,
    sink: &dyn ViewSink,
    cancel: watch::Receiver<bool>,
    mut submissions: mpsc::Receiver<ActionRequest>,
) -> Option<RunEnd> {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            warn!("failed to create runner runtime: {e}");
            return None;
        }
    };
    Some(rt.block_on(run_loop(push, pull, config, sink, cancel, &mut submissions)))
}

/// The async engine loop for one connection.
///
/// On entry the engine is fresh: both bulk log dumps and the current
/// session state are pulled before any push event is processed. The loop
/// then serves push events, the periodic status poll, and outbound
/// submissions until the cancellation token fires or the channel closes.
/// The cancellation token is checked at every iteration boundary; once it
/// fires nothing is re-armed.
pub async fn run_loop<P: PushChannel>(
    mut push: P,
    pull: Arc<dyn PullSource>,
    config: EngineConfig,
    sink: &dyn ViewSink,
    mut cancel: watch::Receiver<bool>,
    submissions: &mut mpsc::Receiver<ActionRequest>,
) -> RunEnd {
    let issuer = RequestIssuer::new(pull);
    let mut engine = SessionEngine::new(config.clone());
    let capture = EffectCapture::new(sink);

    info!(channel = push.name(), "runner starting");

    initial_sync(&mut engine, &issuer, &capture).await;
    drain_effects(&engine, &issuer, &capture).await;

    // First poll fires one full interval from now; the initial sync just
    // pulled the state.
    let mut poll = tokio::time::interval_at(
        tokio::time::Instant::now() + config.poll_interval(),
        config.poll_interval(),
    );

    // One wake-up of the loop. Resolved from the select before any handler
    // runs, so the push channel is free to be used again (a recv future
    // borrows it for the duration of the select).
    enum Turn {
        Cancelled,
        Push(Result<Option<calview_engine::PushEvent>, ChannelError>),
        Submit(ActionRequest),
        Poll,
    }

    let end = loop {
        if *cancel.borrow() {
            break RunEnd::Cancelled;
        }

        let turn = tokio::select! {
            _ = cancel.changed() => Turn::Cancelled,
            event = push.recv() => Turn::Push(event),
            Some(request) = submissions.recv() => Turn::Submit(request),
            _ = poll.tick() => Turn::Poll,
        };

        match turn {
            Turn::Cancelled => {
                // Re-checked at the top of the loop.
            }
            Turn::Push(Ok(Some(event))) => engine.handle_event(event, &capture),
            Turn::Push(Ok(None)) => {}
            Turn::Push(Err(ChannelError::Shutdown)) => {
                info!("push channel shut down");
                sink.status_unavailable();
                break RunEnd::ChannelClosed;
            }
            Turn::Push(Err(e)) => {
                warn!("push channel recv error: {e}");
            }
            Turn::Submit(request) => {
                engine.note_submission(&capture);
                if let Err(e) = push.submit(&request).await {
                    warn!(action = %request.name, "failed to submit action: {e}");
                }
            }
            Turn::Poll => {
                match issuer
                    .issue(PullTarget::SessionStatus, Some(config.retry), &capture)
                    .await
                {
                    Some(PullResponse::SessionStatus(state)) => {
                        engine.apply_state(state, &capture);
                    }
                    Some(other) => warn!(?other, "unexpected status poll response"),
                    None => sink.status_unavailable(),
                }
            }
        }

        drain_effects(&engine, &issuer, &capture).await;
    };

    info!("runner stopped");
    end
}

/// Connect, run, reconnect with capped backoff until cancelled.
///
/// Each (re)connection gets a fresh engine, so the buffers and the applied
/// snapshot reset and the bulk history is re-pulled.
pub async fn run_session(
    endpoints: SessionEndpoints,
    config: EngineConfig,
    sink: &dyn ViewSink,
    cancel: watch::Receiver<bool>,
    mut submissions: mpsc::Receiver<ActionRequest>,
) {
    let pull: Arc<dyn PullSource> = Arc::new(HttpPullClient::new(endpoints.pull_base.clone()));
    let mut backoff_secs = 1u64;

    loop {
        if *cancel.borrow() {
            return;
        }

        match WsPushChannel::connect(&endpoints.push_url).await {
            Ok(push) => {
                backoff_secs = 1;
                let end = run_loop(
                    push,
                    pull.clone(),
                    config.clone(),
                    sink,
                    cancel.clone(),
                    &mut submissions,
                )
                .await;
                if end == RunEnd::Cancelled {
                    return;
                }
            }
            Err(e) => {
                warn!(endpoint = %endpoints.push_url, "push connect failed: {e}");
                sink.status_unavailable();
            }
        }

        if *cancel.borrow() {
            return;
        }
        info!(backoff_secs, "reconnecting push channel");
        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
        backoff_secs = (backoff_secs * 2).min(MAX_RECONNECT_BACKOFF_SECS);
    }
}

/// Pull the bulk history for both streams and the current session state.
async fn initial_sync(
    engine: &mut SessionEngine,
    issuer: &RequestIssuer,
    capture: &EffectCapture<'_>,
) {
    let retry = Some(engine.config().retry);

    for stream in [LogStream::Monitor, LogStream::Command] {
        match issuer
            .issue(PullTarget::LogDump(stream), retry, capture)
            .await
        {
            Some(PullResponse::LogDump(entries)) => {
                engine.apply_log_dump(stream, entries, capture);
            }
            Some(other) => warn!(?other, "unexpected log dump response"),
            None => {}
        }
    }

    match issuer.issue(PullTarget::SessionStatus, retry, capture).await {
        Some(PullResponse::SessionStatus(state)) => engine.apply_state(state, capture),
        Some(other) => warn!(?other, "unexpected status response"),
        None => capture.status_unavailable(),
    }
}

/// Service the effects captured while the engine was handling events:
/// the prompt pull (if one was requested) and the deduplicated heavy
/// payload refetches, honoring `update_pending` with the configured delay.
async fn drain_effects(engine: &SessionEngine, issuer: &RequestIssuer, capture: &EffectCapture<'_>) {
    let retry = Some(engine.config().retry);

    if let Some(epoch) = capture.take_prompt() {
        if let Some(PullResponse::PromptText(text)) =
            issuer.issue(PullTarget::PromptText, retry, capture).await
        {
            // Dropped inside if the state moved on while the pull was in
            // flight.
            engine.apply_prompt(epoch, &text, capture);
        }
    }

    for (tag, detector) in capture.take_refetches() {
        loop {
            let target = PullTarget::DetectorPayload {
                tag: tag.clone(),
                detector: detector.clone(),
            };
            match issuer.issue(target, retry, capture).await {
                Some(PullResponse::DetectorPayload {
                    payload,
                    update_pending,
                }) => {
                    if update_pending {
                        // Still being produced upstream; re-issue after the
                        // configured delay.
                        tokio::time::sleep(engine.config().refetch_delay()).await;
                        continue;
                    }
                    capture.payload_ready(&tag, &detector, &payload);
                    break;
                }
                Some(other) => {
                    warn!(?other, "unexpected payload response");
                    break;
                }
                // Exhausted retries; the issuer already emitted the
                // terminal diagnostic.
                None => break,
            }
        }
    }
}
