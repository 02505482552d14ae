//! Client options and validation.
//!
//! # Example
//!
//! ```ignore
//! let config = ClientConfig::from_json(r#"{
//!     "service": "transcription",
//!     "reconnectDelayMs": 2000
//! }"#)?;
//! assert_eq!(config.endpoint()?.as_str(), "ws://localhost:8766/");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

use super::Service;

// ============================================================================
// Constants
// ============================================================================

/// Fixed delay before a reconnect attempt.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Fixed delay between automatic resend attempts.
pub const DEFAULT_RESEND_DELAY_MS: u64 = 1_000;

/// Upper bound on a single write to the link.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 3_000;

/// Automatic resends after the first attempt (3 attempts total).
pub const DEFAULT_MAX_RESEND_ATTEMPTS: u32 = 2;

// ============================================================================
// ClientConfig
// ============================================================================

/// Session client configuration.
///
/// Every field is optional when deserializing; keys are camelCase to match
/// editor settings (`webSocketUrl`, `reconnectDelayMs`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Backend service; picks the default endpoint and inbound decoding.
    pub service: Service,

    /// Endpoint override. `None` uses [`Service::default_url`].
    #[serde(rename = "webSocketUrl")]
    pub url: Option<String>,

    /// Delay before each reconnect attempt, in milliseconds.
    pub reconnect_delay_ms: u64,

    /// Delay between automatic resend attempts, in milliseconds.
    pub resend_delay_ms: u64,

    /// Upper bound on a single write (or close) of the link, in milliseconds.
    pub send_timeout_ms: u64,

    /// Automatic resend attempts after the first one.
    pub max_resend_attempts: u32,

    /// Re-attempt every queued message as soon as the link opens.
    pub drain_on_reconnect: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Service::Chat)
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ClientConfig {
    /// Creates a configuration with defaults for `service`.
    #[inline]
    #[must_use]
    pub const fn new(service: Service) -> Self {
        Self {
            service,
            url: None,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            resend_delay_ms: DEFAULT_RESEND_DELAY_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            max_resend_attempts: DEFAULT_MAX_RESEND_ATTEMPTS,
            drain_on_reconnect: true,
        }
    }

    /// Parses a JSON settings object and validates it.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the input is not a valid settings object
    /// - [`Error::Config`] / [`Error::InvalidUrl`] if validation fails
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientConfig {
    /// Sets the endpoint URL.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the resend delay.
    #[inline]
    #[must_use]
    pub fn with_resend_delay(mut self, delay: Duration) -> Self {
        self.resend_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Sets the write timeout.
    #[inline]
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the number of automatic resends after the first attempt.
    #[inline]
    #[must_use]
    pub fn with_max_resend_attempts(mut self, attempts: u32) -> Self {
        self.max_resend_attempts = attempts;
        self
    }

    /// Enables or disables draining the queue when the link opens.
    #[inline]
    #[must_use]
    pub fn with_drain_on_reconnect(mut self, drain: bool) -> Self {
        self.drain_on_reconnect = drain;
        self
    }
}

// ============================================================================
// Accessors
// ============================================================================

impl ClientConfig {
    /// Resolves and validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`] if the URL does not parse
    /// - [`Error::InvalidUrl`] if the scheme is not `ws`/`wss` or there is no host
    pub fn endpoint(&self) -> Result<Url> {
        let raw = self
            .url
            .clone()
            .unwrap_or_else(|| self.service.default_url());
        let url = Url::parse(&raw)?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::invalid_url(raw, "scheme must be ws or wss"));
        }
        if url.host_str().is_none() {
            return Err(Error::invalid_url(raw, "missing host"));
        }

        Ok(url)
    }

    /// Returns the reconnect delay.
    #[inline]
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Returns the resend delay.
    #[inline]
    #[must_use]
    pub fn resend_delay(&self) -> Duration {
        Duration::from_millis(self.resend_delay_ms)
    }

    /// Returns the write timeout.
    #[inline]
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Validates the whole configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a delay or the send timeout is zero
    /// - [`Error::Url`] / [`Error::InvalidUrl`] if the endpoint is unusable
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_delay_ms == 0 {
            return Err(Error::config("reconnectDelayMs must be greater than zero"));
        }
        if self.resend_delay_ms == 0 {
            return Err(Error::config("resendDelayMs must be greater than zero"));
        }
        if self.send_timeout_ms == 0 {
            return Err(Error::config("sendTimeoutMs must be greater than zero"));
        }
        self.endpoint()?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.service, Service::Chat);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.resend_delay(), Duration::from_secs(1));
        assert_eq!(config.send_timeout(), Duration::from_secs(3));
        assert_eq!(config.max_resend_attempts, 2);
        assert!(config.drain_on_reconnect);
        assert_eq!(
            config.endpoint().expect("endpoint").as_str(),
            "ws://localhost:8765/"
        );
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new(Service::Transcription)
            .with_url("ws://127.0.0.1:9999")
            .with_reconnect_delay(Duration::from_millis(250))
            .with_resend_delay(Duration::from_secs(2))
            .with_send_timeout(Duration::from_millis(1500))
            .with_max_resend_attempts(4)
            .with_drain_on_reconnect(false);

        assert_eq!(config.url.as_deref(), Some("ws://127.0.0.1:9999"));
        assert_eq!(config.reconnect_delay_ms, 250);
        assert_eq!(config.resend_delay_ms, 2000);
        assert_eq!(config.send_timeout_ms, 1500);
        assert_eq!(config.max_resend_attempts, 4);
        assert!(!config.drain_on_reconnect);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ClientConfig::from_json(
            r#"{ "service": "transcription", "reconnectDelayMs": 2000 }"#,
        )
        .expect("parse");

        assert_eq!(config.service, Service::Transcription);
        assert_eq!(config.reconnect_delay_ms, 2000);
        assert_eq!(config.resend_delay_ms, DEFAULT_RESEND_DELAY_MS);
        assert_eq!(
            config.endpoint().expect("endpoint").as_str(),
            "ws://localhost:8766/"
        );
    }

    #[test]
    fn test_from_json_url_override() {
        let config =
            ClientConfig::from_json(r#"{ "webSocketUrl": "wss://backend.local:443/chat" }"#)
                .expect("parse");
        assert_eq!(config.endpoint().expect("endpoint").scheme(), "wss");
    }

    #[test]
    fn test_rejects_http_scheme() {
        let err = ClientConfig::default()
            .with_url("http://localhost:8765")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let err = ClientConfig::default().with_url("::::").validate().unwrap_err();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_rejects_zero_delay() {
        let err = ClientConfig::default()
            .with_resend_delay(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("resendDelayMs"));

        let err = ClientConfig::from_json(r#"{ "reconnectDelayMs": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_zero_send_timeout() {
        let err = ClientConfig::from_json(r#"{ "sendTimeoutMs": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("sendTimeoutMs"));
    }
}
