//! Type-safe identifier wrappers.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`MessageKey`] | Identity of an outbound message in the delivery queue |
//! | [`SessionId`] | Live-transcription session issued by the backend |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// MessageKey
// ============================================================================

/// Identity key used to coalesce and retry-track outbound messages.
///
/// Derived from the message text: two submissions with the same text map to
/// the same key and therefore to the same queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey(String);

impl MessageKey {
    /// Derives the key for a message text.
    #[inline]
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self(text.to_owned())
    }

    /// Returns the key as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys are whole messages; keep log lines short.
        const MAX_CHARS: usize = 32;
        let mut chars = self.0.chars();
        let head: String = chars.by_ref().take(MAX_CHARS).collect();
        if chars.next().is_some() {
            write!(f, "{head}…")
        } else {
            f.write_str(&head)
        }
    }
}

// ============================================================================
// SessionId
// ============================================================================

/// Correlation token for one live-transcription session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw session id.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_text_same_key() {
        assert_eq!(MessageKey::from_text("hello"), MessageKey::from_text("hello"));
        assert_ne!(MessageKey::from_text("hello"), MessageKey::from_text("hello "));
    }

    #[test]
    fn test_key_display_truncates() {
        let long = "x".repeat(100);
        let shown = MessageKey::from_text(&long).to_string();
        assert_eq!(shown.chars().count(), 33);
        assert!(shown.ends_with('…'));

        assert_eq!(MessageKey::from_text("short").to_string(), "short");
    }

    #[test]
    fn test_session_id_serde_transparent() {
        let id: SessionId = serde_json::from_str("\"abc-123\"").expect("parse");
        assert_eq!(id.as_str(), "abc-123");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"abc-123\"");
    }
}
