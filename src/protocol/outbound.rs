//! Chat messages and their wire frame.
//!
//! An [`OutboundMessage`] is what callers submit; an [`OutboundFrame`] is
//! what goes on the wire.
//!
//! # Format
//!
//! ```json
//! {
//!   "type": "text",
//!   "message": "Can you help me understand this code?",
//!   "files": [{ "filename": "main.py", "content": "print('hi')" }]
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identifiers::MessageKey;

// ============================================================================
// Constants
// ============================================================================

/// Frame type marker for chat messages.
const TEXT_FRAME_TYPE: &str = "text";

// ============================================================================
// Attachment
// ============================================================================

/// A file attached to a chat message as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name, used by the backend to pick a language fence.
    pub filename: String,
    /// File content.
    pub content: String,
}

impl Attachment {
    /// Creates a new attachment.
    #[inline]
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// OutboundMessage
// ============================================================================

/// A unit of work submitted for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Message text.
    pub text: String,

    /// Optional attached context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Attachment>,
}

impl OutboundMessage {
    /// Creates a message without context.
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    /// Attaches a context file.
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: Attachment) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the identity key of this message.
    #[inline]
    #[must_use]
    pub fn key(&self) -> MessageKey {
        MessageKey::from_text(&self.text)
    }

    /// Returns `true` if there is no text to send.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Builds the wire frame borrowing from this message.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> OutboundFrame<'_> {
        OutboundFrame {
            frame_type: TEXT_FRAME_TYPE,
            message: &self.text,
            files: self.context.as_slice(),
        }
    }

    /// Serializes the wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.frame())?)
    }
}

// ============================================================================
// OutboundFrame
// ============================================================================

/// Wire form of a chat message.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame<'a> {
    /// Always `"text"`.
    #[serde(rename = "type")]
    pub frame_type: &'static str,

    /// Message text.
    pub message: &'a str,

    /// Attached files; empty when there is no context.
    pub files: &'a [Attachment],
}

// ============================================================================
// Tests
// ============================================================================
