//! Status notifications for the UI observer.
//!
//! The client reports connection liveness, delivery outcomes and inbound
//! payloads as [`StatusEvent`]s through a [`StatusChannel`]. The channel has
//! a single observer slot; events emitted while the slot is empty are
//! dropped.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Observer slot and notification |
//! | `event` | Status event enum |

// ============================================================================
// Submodules
// ============================================================================

/// Observer slot and notification.
pub mod channel;

/// Status event enum.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{Observer, StatusChannel, channel_observer};
pub use event::StatusEvent;
