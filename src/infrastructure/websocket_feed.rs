// WebSocket feed transport (receive-only)
use crate::application::connection_manager::{FeedTransport, FrameStream};
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

enum Inbound {
    Frame(Bytes),
    Closed,
    Ignored,
}

fn classify(message: Message) -> Inbound {
    match message {
        Message::Text(text) => Inbound::Frame(Bytes::from(text)),
        Message::Binary(data) => Inbound::Frame(Bytes::from(data)),
        Message::Close(reason) => {
            if let Some(reason) = reason {
                tracing::debug!(code = u16::from(reason.code), "Feed closed: {}", reason.reason);
            }
            Inbound::Closed
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Ignored,
    }
}

#[async_trait]
impl FeedTransport for WebSocketTransport {
    async fn connect(&self, endpoint: &str) -> anyhow::Result<FrameStream> {
        let (socket, response) = tokio_tungstenite::connect_async(endpoint)
            .await
            .with_context(|| format!("Failed to open WebSocket to {endpoint}"))?;
        tracing::debug!(status = %response.status(), "WebSocket handshake complete");

        let frames = async_stream::stream! {
            let mut socket = socket;
            while let Some(message) = socket.next().await {
                match message {
                    Ok(message) => match classify(message) {
                        Inbound::Frame(frame) => yield Ok(frame),
                        Inbound::Closed => break,
                        Inbound::Ignored => {}
                    },
                    Err(e) => {
                        yield Err(anyhow::Error::new(e).context("WebSocket read failed"));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(frames))
    }
}
