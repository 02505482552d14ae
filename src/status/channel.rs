//! Observer slot and notification.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use super::StatusEvent;

// ============================================================================
// Types
// ============================================================================

/// Observer callback type.
///
/// Called once per event, synchronously, from the client's event loop. It
/// must not block and must not call back into the [`StatusChannel`] it is
/// registered on.
pub type Observer = Box<dyn Fn(StatusEvent) + Send + Sync>;

/// Wraps an unbounded channel sender as an observer.
///
/// Events are dropped silently once the receiver is gone.
#[must_use]
pub fn channel_observer(tx: mpsc::UnboundedSender<StatusEvent>) -> Observer {
    Box::new(move |event| {
        let _ = tx.send(event);
    })
}

// ============================================================================
// StatusChannel
// ============================================================================

/// One-slot, fire-and-forget notification sink.
///
/// Cloning shares the slot.
#[derive(Clone, Default)]
pub struct StatusChannel {
    observer: Arc<Mutex<Option<Observer>>>,
}

impl StatusChannel {
    /// Creates a channel with no observer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the observer, replacing any previous one.
    pub fn set_observer(&self, observer: Observer) {
        *self.observer.lock() = Some(observer);
    }

    /// Removes the observer.
    pub fn clear_observer(&self) {
        *self.observer.lock() = None;
    }

    /// Returns `true` if an observer is registered.
    #[inline]
    #[must_use]
    pub fn has_observer(&self) -> bool {
        self.observer.lock().is_some()
    }

    /// Delivers an event to the observer, or drops it if there is none.
    pub fn notify(&self, event: StatusEvent) {
        let guard = self.observer.lock();
        match guard.as_ref() {
            Some(observer) => observer(event),
            None => trace!(event = event.wire_name(), "No observer, status dropped"),
        }
    }
}

impl std::fmt::Debug for StatusChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusChannel")
            .field("has_observer", &self.has_observer())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
