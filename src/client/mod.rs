//! Resilient client for one backend service.
//!
//! A [`Client`] keeps a single duplex link to the chat or transcription
//! backend alive, delivers outbound messages with bounded automatic
//! resends, and routes inbound frames to the status observer.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | `Client` handle |
//! | `event_loop` | Task that owns the link, timers and queue |
//! | `lifecycle` | Connection state machine |
//! | `queue` | Outbound delivery queue |
//! | `router` | Inbound frame decoding |
//!
//! # Example
//!
//! ```ignore
//! let client = Client::spawn(ClientConfig::new(Service::Transcription))?;
//! let mut events = client.subscribe();
//!
//! client.connect()?;
//! client.wait_for_state(ConnectionState::Connected).await?;
//! client.send_control(ControlCommand::StartRecording).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let StatusEvent::Transcription { text: Some(text), .. } = event {
//!         println!("{text}");
//!     }
//! }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod event_loop;

/// Connection state machine.
pub mod lifecycle;

/// Outbound delivery queue.
pub mod queue;

/// Inbound frame decoding.
pub mod router;


// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::Client;
pub use lifecycle::{ConnectionLifecycle, ConnectionState};
pub use queue::{DeliveryQueue, Enqueued, Failure};
pub use router::InboundRouter;
