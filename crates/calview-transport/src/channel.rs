//! Push channel trait and transport errors.
//!
//! The push channel is duplex: the server streams events down it, and
//! outbound action submissions go up it. There are no request/response
//! semantics -- a submission is acknowledged only by later action-status
//! events. The pull side is the engine's
//! [`PullSource`](calview_engine::PullSource) trait, implemented by
//! [`HttpPullClient`](crate::HttpPullClient).

use async_trait::async_trait;
use thiserror::Error;

use calview_engine::PushEvent;
use calview_types::{ActionRequest, CalviewError};

/// Errors from channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("channel shut down")]
    Shutdown,
}

impl From<ChannelError> for CalviewError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::Malformed(msg) => CalviewError::MalformedPayload(msg),
            other => CalviewError::Transport(other.to_string()),
        }
    }
}

/// Trait for the duplex push channel.
///
/// The runner drives `recv` from its select loop; delivery order within
/// the channel is preserved by the transport, but not relative to pull
/// responses.
#[async_trait]
pub trait PushChannel: Send {
    /// Receive the next normalized event.
    ///
    /// Returns `Ok(None)` when no event arrived within the transport's
    /// internal timeout, and [`ChannelError::Shutdown`] once the peer
    /// closed the connection.
    async fn recv(&mut self) -> Result<Option<PushEvent>, ChannelError>;

    /// Submit an outbound action. Fire-and-forget: the engine learns the
    /// outcome from subsequent action-status events.
    async fn submit(&mut self, request: &ActionRequest) -> Result<(), ChannelError>;

    /// Human-readable name for this channel backend.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_maps_to_malformed_payload() {
        let err: CalviewError = ChannelError::Malformed("missing type".into()).into();
        assert!(matches!(err, CalviewError::MalformedPayload(_)));
    }

    #[test]
    fn shutdown_maps_to_transport() {
        let err: CalviewError = ChannelError::Shutdown.into();
        assert!(matches!(err, CalviewError::Transport(_)));
        assert_eq!(err.to_string(), "transport failure: channel shut down");
    }

    #[test]
    fn api_error_display() {
        let err = ChannelError::Api("session not found".into());
        assert_eq!(err.to_string(), "API returned error: session not found");
    }
}
