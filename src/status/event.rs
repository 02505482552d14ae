//! Status event enum.
//!
//! Events serialize to the message shape the webview expects:
//!
//! ```json
//! { "command": "wsStatus", "connected": true }
//! { "command": "sendFailed", "message": { "text": "hello" } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::identifiers::SessionId;
use crate::protocol::{OutboundMessage, ReplyKind, TranscriptionStatus};

// ============================================================================
// StatusEvent
// ============================================================================

/// A connection or delivery transition reported to the observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all_fields = "camelCase")]
pub enum StatusEvent {
    /// Link opened (`true`) or dropped (`false`).
    #[serde(rename = "wsStatus")]
    Connection {
        /// Whether the link is now open.
        connected: bool,
    },

    /// A message was written to the link.
    #[serde(rename = "sendSuccess")]
    SendSuccess {
        /// Text of the delivered message.
        text: String,
    },

    /// Automatic attempts are exhausted.
    ///
    /// Carries the original message so the UI can offer a manual retry.
    #[serde(rename = "sendFailed")]
    SendFailed {
        /// The message that could not be delivered.
        message: OutboundMessage,
    },

    /// An attempt failed and another one is scheduled.
    #[serde(rename = "retrying")]
    Retrying {
        /// Text of the message being retried.
        text: String,
        /// Failed attempts so far.
        attempt: u32,
        /// Total attempts allowed before giving up.
        max_attempts: u32,
    },

    /// A chat reply arrived.
    #[serde(rename = "receiveMessage")]
    ReceiveMessage {
        /// Reply kind.
        kind: ReplyKind,
        /// Reply text.
        text: String,
        /// Backend chat session, when reported.
        session_id: Option<String>,
    },

    /// A transcription update for the current session arrived.
    #[serde(rename = "transcription")]
    Transcription {
        /// Session the update belongs to.
        session_id: SessionId,
        /// Update status.
        status: TranscriptionStatus,
        /// Transcript text, if any.
        text: Option<String>,
    },

    /// The recorder answered a control command.
    #[serde(rename = "commandReply")]
    CommandReply {
        /// Whether the command succeeded.
        success: bool,
        /// Human-readable detail.
        message: Option<String>,
        /// Device list, when requested.
        devices: Option<Value>,
    },
}

impl StatusEvent {
    /// Returns the webview command name of this event.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "wsStatus",
            Self::SendSuccess { .. } => "sendSuccess",
            Self::SendFailed { .. } => "sendFailed",
            Self::Retrying { .. } => "retrying",
            Self::ReceiveMessage { .. } => "receiveMessage",
            Self::Transcription { .. } => "transcription",
            Self::CommandReply { .. } => "commandReply",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
