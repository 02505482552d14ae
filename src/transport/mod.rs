//! WebSocket transport layer.
//!
//! The client never touches sockets directly. It asks a [`Connector`] to
//! open a [`Link`]: a sink of outbound text frames and a stream of inbound
//! text frames. [`WsConnector`] is the production implementation over
//! `tokio-tungstenite`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Backend        │
//! │                 │         WebSocket            │  (chat / STT)   │
//! │  EventLoop      │◄────────────────────────────►│                 │
//! │  → Link         │      localhost:8765/8766     │  WebSocket      │
//! │                 │                              │  Server         │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `link` | `Link` halves and the `Connector` trait |
//! | `websocket` | `tokio-tungstenite` connector |

// ============================================================================
// Submodules
// ============================================================================

/// Link halves and the connector trait.
pub mod link;

/// `tokio-tungstenite` connector.
pub mod websocket;

/// In-memory connector for tests.
#[cfg(test)]
pub(crate) mod memory;

// ============================================================================
// Re-exports
// ============================================================================

pub use link::{Connector, FrameSink, FrameStream, Link};
pub use websocket::WsConnector;
