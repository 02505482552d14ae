//! In-memory connector for tests.
//!
//! Lets a test decide whether the endpoint is reachable, fail or stall
//! writes, push inbound frames and drop the current link, while recording
//! every frame the client managed to write.

// ============================================================================
// Imports
// ============================================================================

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::{Sink, stream};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;

use crate::error::{Error, Result};

use super::{Connector, Link};

// ============================================================================
// MemoryConnector
// ============================================================================

#[derive(Default)]
struct MemoryState {
    reachable: bool,
    fail_sends: bool,
    reject_sends: bool,
    stall_sends: bool,
    open_attempts: usize,
    sent: Vec<String>,
    inbound_tx: Option<mpsc::UnboundedSender<Result<String>>>,
    link_alive: Option<Arc<AtomicBool>>,
}

/// Test connector; clones share state.
#[derive(Clone, Default)]
pub(crate) struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub(crate) fn reachable() -> Self {
        let connector = Self::default();
        connector.set_reachable(true);
        connector
    }

    pub(crate) fn unreachable() -> Self {
        Self::default()
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    pub(crate) fn set_fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    /// Makes writes fail with an error a resend cannot fix.
    pub(crate) fn set_reject_sends(&self, reject: bool) {
        self.state.lock().reject_sends = reject;
    }

    /// Makes writes and closes never complete, like a peer that stopped
    /// reading with a full socket buffer.
    pub(crate) fn set_stall_sends(&self, stall: bool) {
        self.state.lock().stall_sends = stall;
    }

    pub(crate) fn open_attempts(&self) -> usize {
        self.state.lock().open_attempts
    }

    /// Frames successfully written by the client, across all links.
    pub(crate) fn sent(&self) -> Vec<String> {
        self.state.lock().sent.clone()
    }

    /// Pushes an inbound frame on the current link.
    pub(crate) fn push(&self, text: &str) {
        if let Some(tx) = self.state.lock().inbound_tx.as_ref() {
            let _ = tx.send(Ok(text.to_owned()));
        }
    }

    /// Pushes a non-fatal decode failure on the current link.
    pub(crate) fn push_undecodable(&self) {
        if let Some(tx) = self.state.lock().inbound_tx.as_ref() {
            let _ = tx.send(Err(Error::protocol("binary frame is not UTF-8")));
        }
    }

    /// Drops the current link as if the backend went away.
    pub(crate) fn drop_link(&self) {
        let mut state = self.state.lock();
        state.inbound_tx = None;
        if let Some(alive) = state.link_alive.take() {
            alive.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, url: &Url) -> Result<Link> {
        let mut state = self.state.lock();
        state.open_attempts += 1;

        if !state.reachable {
            return Err(Error::connection(format!("{url}: connection refused")));
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let alive = Arc::new(AtomicBool::new(true));
        state.inbound_tx = Some(inbound_tx);
        state.link_alive = Some(Arc::clone(&alive));

        let sink = MemorySink {
            state: Arc::clone(&self.state),
            alive,
        };

        let stream = stream::unfold(inbound_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        Ok(Link::new(Box::pin(sink), Box::pin(stream)))
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// Write half of a memory link. Each write is applied immediately unless
/// writes are stalled.
struct MemorySink {
    state: Arc<Mutex<MemoryState>>,
    alive: Arc<AtomicBool>,
}

impl MemorySink {
    fn poll_unless_stalled(&self) -> Poll<Result<()>> {
        if self.state.lock().stall_sends {
            Poll::Pending
        } else {
            Poll::Ready(Ok(()))
        }
    }
}

impl Sink<String> for MemorySink {
    type Error = Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.poll_unless_stalled()
    }

    fn start_send(self: Pin<&mut Self>, text: String) -> Result<()> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(Error::connection("link dropped"));
        }
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(Error::connection("write failed"));
        }
        if state.reject_sends {
            return Err(Error::protocol("frame rejected"));
        }
        state.sent.push(text);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.poll_unless_stalled()
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.state.lock().stall_sends {
            return Poll::Pending;
        }
        self.alive.store(false, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}
