//! `tokio-tungstenite` connector.
//!
//! Text frames map one-to-one onto link items. Binary frames are decoded as
//! UTF-8; ping, pong and raw frames never reach the client. The stream ends
//! after the peer's close frame.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

use super::{Connector, Link};

// ============================================================================
// WsConnector
// ============================================================================

/// Opens plain WebSocket links.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a new connector.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &Url) -> Result<Link> {
        let (ws_stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::connection(format!("{url}: {e}")))?;

        debug!(url = %url, status = %response.status(), "WebSocket handshake completed");

        let (ws_write, ws_read) = ws_stream.split();

        let sink = ws_write
            .with(|text: String| async move { Ok::<_, Error>(Message::Text(text.into())) });

        let stream = ws_read.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => Some(String::from_utf8(data.to_vec()).map_err(|e| {
                    Error::protocol(format!("binary frame is not UTF-8: {e}"))
                })),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "WebSocket closed by remote");
                    None
                }
                // Ping, Pong and raw frames are handled by tungstenite
                Ok(_) => None,
                Err(e) => Some(Err(Error::from(e))),
            }
        });

        Ok(Link::new(Box::pin(sink), Box::pin(stream)))
    }
}
