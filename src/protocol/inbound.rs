//! Frames received from the backend.
//!
//! # Chat
//!
//! ```json
//! { "type": "response", "message": "...", "session_id": "..." }
//! ```
//!
//! Only `message` is required; `type` defaults to `response`.
//!
//! # Transcription
//!
//! ```json
//! { "type": "transcription", "data": { "sessionId": "...", "status": "ready" } }
//! { "type": "transcription", "data": { "sessionId": "...", "status": "transcribing", "text": "..." } }
//! { "status": "success", "message": "Recording started." }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::SessionId;

// ============================================================================
// ChatReply
// ============================================================================

/// Kind of a chat reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    /// Model response.
    #[default]
    Response,
    /// Backend-side error (for example, an internal server error).
    Error,
    /// Receipt acknowledgement.
    Ack,
    /// Any other type tag.
    #[serde(other)]
    Other,
}

/// A reply from the chat backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// Reply kind.
    #[serde(rename = "type", default)]
    pub kind: ReplyKind,

    /// Reply text.
    pub message: String,

    /// Backend chat session, when reported.
    #[serde(default)]
    pub session_id: Option<String>,
}

// ============================================================================
// TranscriptionFrame
// ============================================================================

/// Status carried by a transcription update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionStatus {
    /// A new session started; its id becomes the current session.
    Ready,
    /// Partial or full transcript for a session.
    Transcribing,
    /// Any other status.
    #[serde(other)]
    Other,
}

/// Payload of a transcription frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptionData {
    /// Session the update belongs to.
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,

    /// Update status.
    pub status: TranscriptionStatus,

    /// Transcript text, if any.
    #[serde(default)]
    pub text: Option<String>,
}

/// A live-transcription update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranscriptionFrame {
    /// Frame type marker (expected `"transcription"`).
    #[serde(rename = "type")]
    pub frame_type: String,

    /// Update payload.
    pub data: TranscriptionData,
}

// ============================================================================
// CommandReply
// ============================================================================

/// Outcome of a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// Command succeeded.
    Success,
    /// Command failed.
    Error,
}

/// Reply from the recorder's command server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandReply {
    /// Outcome.
    pub status: ReplyStatus,

    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,

    /// Device list (only for `list_input_devices`).
    #[serde(default)]
    pub devices: Option<Value>,
}

impl CommandReply {
    /// Returns `true` if the command succeeded.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ReplyStatus::Success
    }
}

// ============================================================================
// Tests
// ============================================================================
