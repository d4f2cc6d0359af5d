//! WebSocket push channel.
//!
//! One long-lived socket carries JSON text frames in both directions:
//! server events down, action submissions up. Socket closure surfaces as
//! [`ChannelError::Shutdown`] so the runner can tear down and reconnect.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};
use uuid::Uuid;

use calview_engine::PushEvent;
use calview_types::ActionRequest;

use crate::channel::{ChannelError, PushChannel};
use crate::decode;

/// Push channel over a WebSocket connection.
pub struct WsPushChannel {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    endpoint: String,
}

impl WsPushChannel {
    /// Connect to the controller's push endpoint (`ws://` or `wss://`).
    pub async fn connect(endpoint: &str) -> Result<Self, ChannelError> {
        let (socket, _response) = connect_async(endpoint).await?;
        info!(endpoint, "push channel connected");
        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
        })
    }

    /// The endpoint this channel is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushChannel for WsPushChannel {
    async fn recv(&mut self) -> Result<Option<PushEvent>, ChannelError> {
        loop {
            match self.socket.next().await {
                None => return Err(ChannelError::Shutdown),
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(Message::Close(_))) => return Err(ChannelError::Shutdown),
                Some(Ok(Message::Text(text))) => {
                    let value: Value = match serde_json::from_str(text.as_str()) {
                        Ok(value) => value,
                        Err(e) => {
                            warn!(error = %e, "dropping non-JSON push frame");
                            continue;
                        }
                    };
                    match decode::decode_push_frame(&value) {
                        Ok(event) => return Ok(Some(event)),
                        Err(e) => {
                            // One bad frame never takes the channel down.
                            warn!(error = %e, "dropping malformed push frame");
                            continue;
                        }
                    }
                }
                // Ping/pong is handled by tungstenite; binary frames are
                // not part of the protocol.
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn submit(&mut self, request: &ActionRequest) -> Result<(), ChannelError> {
        let frame = serde_json::json!({
            "type": "action",
            "id": Uuid::new_v4(),
            "name": request.name,
            "args": request.args,
        });
        self.socket
            .send(Message::Text(frame.to_string().into()))
            .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "websocket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_frame_shape() {
        let request = ActionRequest::with_args("zscan", serde_json::json!({"boards": [1]}));
        let frame = serde_json::json!({
            "type": "action",
            "id": Uuid::new_v4(),
            "name": request.name,
            "args": request.args,
        });
        assert_eq!(frame["type"], "action");
        assert_eq!(frame["name"], "zscan");
        assert_eq!(frame["args"]["boards"][0], 1);
        assert!(frame["id"].as_str().is_some());
    }
}
