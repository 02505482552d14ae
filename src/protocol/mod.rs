//! WebSocket frame types.
//!
//! This module defines the JSON envelopes exchanged with the backend.
//! Payload content is opaque to the client; only the envelopes are typed.
//!
//! # Protocol Overview
//!
//! | Frame | Direction | Service |
//! |-------|-----------|---------|
//! | [`OutboundFrame`] | Local → Remote | Chat |
//! | [`ControlCommand`] | Local → Remote | Transcription |
//! | [`ChatReply`] | Remote → Local | Chat |
//! | [`TranscriptionFrame`] | Remote → Local | Transcription |
//! | [`CommandReply`] | Remote → Local | Transcription |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Recorder control commands |
//! | `inbound` | Frames received from the backend |
//! | `outbound` | Chat messages and their wire frame |

// ============================================================================
// Submodules
// ============================================================================

/// Recorder control commands.
pub mod command;

/// Frames received from the backend.
pub mod inbound;

/// Chat messages and their wire frame.
pub mod outbound;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::ControlCommand;
pub use inbound::{
    ChatReply, CommandReply, ReplyKind, ReplyStatus, TranscriptionData, TranscriptionFrame,
    TranscriptionStatus,
};
pub use outbound::{Attachment, OutboundFrame, OutboundMessage};
