//! Backend service kinds.
//!
//! The companion backend exposes two WebSocket services on well-known
//! loopback ports. The service decides the default endpoint and how inbound
//! frames are decoded.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Default port of the chat backend.
pub const CHAT_PORT: u16 = 8765;

/// Default port of the live-transcription backend.
pub const TRANSCRIPTION_PORT: u16 = 8766;

/// Default host for both services.
const DEFAULT_HOST: &str = "localhost";

// ============================================================================
// Service
// ============================================================================

/// Which backend service a client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Chat backend: text messages out, model replies in.
    #[default]
    Chat,
    /// Live-transcription backend: control commands out, session-scoped
    /// transcription updates in.
    Transcription,
}

impl Service {
    /// Returns the well-known port for this service.
    #[inline]
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Chat => CHAT_PORT,
            Self::Transcription => TRANSCRIPTION_PORT,
        }
    }

    /// Returns the default endpoint URL for this service.
    #[must_use]
    pub fn default_url(self) -> String {
        format!("ws://{DEFAULT_HOST}:{}", self.default_port())
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => f.write_str("chat"),
            Self::Transcription => f.write_str("transcription"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
