//! Link halves and the connector trait.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, Stream};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Outbound half of a link.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;

/// Inbound half of a link.
///
/// Yields one item per text frame. An `Err` that is a
/// [connection error](Error::is_connection_error) ends the link; any other
/// `Err` is a single undecodable frame.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

// ============================================================================
// Link
// ============================================================================

/// An open duplex channel, split into its two halves.
pub struct Link {
    /// Outbound frames.
    pub sink: FrameSink,
    /// Inbound frames.
    pub stream: FrameStream,
}

impl Link {
    /// Creates a link from its halves.
    #[inline]
    #[must_use]
    pub fn new(sink: FrameSink, stream: FrameStream) -> Self {
        Self { sink, stream }
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").finish_non_exhaustive()
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Opens links to an endpoint.
///
/// Each call opens exactly one channel. Retrying is the caller's job.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a new link to `url`.
    ///
    /// # Errors
    ///
    /// Returns a connection error if the channel cannot be opened.
    async fn open(&self, url: &Url) -> Result<Link>;
}
