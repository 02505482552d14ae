//! Error types for the session client.
//!
//! Most failures in this crate never reach the caller: connection errors are
//! absorbed by the reconnect loop and delivery errors are reported to the
//! observer as [`StatusEvent::SendFailed`](crate::StatusEvent::SendFailed).
//! The variants below cover what is left: bad configuration, a client that
//! has already been shut down, and fire-and-forget control commands.
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::Connection`], [`Error::SendTimeout`], [`Error::ConnectionClosed`], [`Error::NotConnected`] |
//! | Protocol | [`Error::Protocol`], [`Error::EmptyMessage`] |
//! | External | [`Error::Json`], [`Error::WebSocket`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a [`ClientConfig`](crate::ClientConfig) fails validation.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint URL is not a usable WebSocket address.
    #[error("Invalid WebSocket URL {url}: {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    ///
    /// Produced by connectors when a channel cannot be opened or written.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// A write on the link did not complete in time.
    ///
    /// The link is treated as dead and reopened.
    #[error("Send timeout after {timeout_ms}ms")]
    SendTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The client has been closed and its event loop has stopped.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The link is not open right now.
    ///
    /// Only returned by operations without a retry policy.
    #[error("Not connected")]
    NotConnected,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Malformed or unexpected frame.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Outbound message has no text.
    #[error("Message text is empty")]
    EmptyMessage,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a send timeout error.
    #[inline]
    pub fn send_timeout(timeout_ms: u64) -> Self {
        Self::SendTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::SendTimeout { .. }
                | Self::ConnectionClosed
                | Self::NotConnected
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed once the link is back up; a failed
    /// delivery attempt is retried only for these.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::SendTimeout { .. }
                | Self::NotConnected
                | Self::WebSocket(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::connection("refused");
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("reconnect delay must be non-zero");
        assert_eq!(
            err.to_string(),
            "Configuration error: reconnect delay must be non-zero"
        );
    }

    #[test]
    fn test_invalid_url_display() {
        let err = Error::invalid_url("http://localhost", "scheme must be ws or wss");
        assert!(err.to_string().contains("http://localhost"));
        assert!(err.to_string().contains("ws or wss"));
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::NotConnected.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
        assert!(!Error::EmptyMessage.is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::NotConnected.is_recoverable());
        assert!(!Error::ConnectionClosed.is_recoverable());
        assert!(!Error::protocol("bad frame").is_recoverable());
    }

    #[test]
    fn test_send_timeout() {
        let err = Error::send_timeout(2_000);
        assert_eq!(err.to_string(), "Send timeout after 2000ms");
        assert!(err.is_connection_error());
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
    }
}
