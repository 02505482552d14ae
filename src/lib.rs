//! Rubberduck Link - Resilient WebSocket client for the Rubberduck backends.
//!
//! This library keeps a single duplex connection to the Rubberduck chat or
//! transcription backend alive, delivers outbound messages with bounded
//! automatic resends, and reports everything that happens to one status
//! observer (typically the editor webview).
//!
//! # Architecture
//!
//! ```text
//!  UI / editor                    Client task                      Backend
//! ┌────────────┐  submit/retry  ┌───────────────────┐  WebSocket  ┌──────────┐
//! │  Client    │───────────────►│  EventLoop        │◄───────────►│ chat     │
//! │  handle    │  control cmds  │  lifecycle/queue  │  text/JSON  │ (8765)   │
//! │            │◄───────────────│  router           │             │ STT      │
//! └────────────┘  StatusEvent   └───────────────────┘             │ (8766)   │
//!                                                                 └──────────┘
//! ```
//!
//! Key design principles:
//!
//! - One task owns all mutable state; handles talk to it over a channel
//! - Every timer and link event carries a generation; stale ones are ignored
//! - Messages are identified by their text; duplicates share one retry cycle
//! - The link is re-established forever at a fixed delay until closed
//!
//! # Quick Start
//!
//! ```no_run
//! use rubberduck_link::{Client, ClientConfig, OutboundMessage, Result, Service, StatusEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::spawn(ClientConfig::new(Service::Chat))?;
//!     let mut events = client.subscribe();
//!
//!     client.connect()?;
//!     client.submit(OutboundMessage::new("Why does this loop never end?"))?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             StatusEvent::ReceiveMessage { text, .. } => println!("{text}"),
//!             StatusEvent::SendFailed { message } => {
//!                 eprintln!("not delivered: {}", message.text);
//!             }
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] handle, connection lifecycle, delivery queue |
//! | [`config`] | [`ClientConfig`] and [`Service`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire message types |
//! | [`status`] | Observer notifications |
//! | [`transport`] | WebSocket transport layer |

// ============================================================================
// Modules
// ============================================================================

/// Client handle and the machinery behind it.
///
/// - [`Client`] - Handle to a running session
/// - [`ConnectionState`] - Liveness of the link
/// - [`InboundRouter`] - Inbound frame decoding
pub mod client;

/// Client configuration.
///
/// Use [`ClientConfig::new()`] or deserialize the settings JSON.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers for message identity and transcription sessions.
pub mod identifiers;

/// Wire message types.
///
/// Outbound frames, inbound replies and recorder control commands.
pub mod protocol;

/// Status notifications for the UI observer.
pub mod status;

/// WebSocket transport layer.
///
/// Connector abstraction and the `tokio-tungstenite` implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ConnectionState, InboundRouter};

// Config types
pub use config::{ClientConfig, Service};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{MessageKey, SessionId};

// Protocol types
pub use protocol::{
    Attachment, ChatReply, CommandReply, ControlCommand, OutboundMessage, ReplyKind,
    TranscriptionStatus,
};

// Status types
pub use status::{Observer, StatusChannel, StatusEvent, channel_observer};

// Transport types
pub use transport::{Connector, Link, WsConnector};
