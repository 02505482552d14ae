//! Client configuration.
//!
//! [`ClientConfig`] carries everything that used to be hard-coded in the
//! editor extension: endpoint, reconnect delay, resend delay and retry
//! budget. It can be built fluently or parsed from a JSON settings blob.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use rubberduck_link::{ClientConfig, Service};
//!
//! let config = ClientConfig::new(Service::Chat)
//!     .with_url("ws://127.0.0.1:9000")
//!     .with_resend_delay(Duration::from_secs(2));
//!
//! assert!(config.validate().is_ok());
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Client options and validation.
pub mod options;

/// Backend service kinds and their default endpoints.
pub mod service;

// ============================================================================
// Re-exports
// ============================================================================

pub use options::ClientConfig;
pub use service::Service;
