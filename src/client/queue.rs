//! Outbound delivery queue.
//!
//! Holds messages that have been submitted but not yet delivered or given
//! up on, one entry per [`MessageKey`]. The queue decides *what* to attempt
//! and what a failure means; the event loop does the writing and the timing.
//!
//! Every attempt stamps its entry with a fresh generation. A resend timer
//! carries the generation of the failure that scheduled it, so a timer that
//! was overtaken by a manual retry, a reconnect drain or a delivery is
//! recognised as stale.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::MessageKey;
use crate::protocol::OutboundMessage;

// ============================================================================
// Types
// ============================================================================

/// Result of [`DeliveryQueue::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    /// A new or reset entry is ready for an immediate attempt.
    Ready(MessageKey),
    /// An entry with the same key is already mid-cycle; nothing to do.
    Coalesced(MessageKey),
}

/// What a failed attempt means for its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Another automatic attempt is allowed.
    Retry {
        /// Failed attempts so far.
        attempt: u32,
        /// Total attempts allowed.
        max_attempts: u32,
        /// Generation the resend timer must carry.
        generation: u64,
    },
    /// Budget spent; the entry has been removed.
    Exhausted(OutboundMessage),
}

#[derive(Debug)]
struct Entry {
    message: OutboundMessage,
    failures: u32,
    generation: u64,
    seq: u64,
}

// ============================================================================
// DeliveryQueue
// ============================================================================

/// Outbound messages awaiting delivery, keyed by identity.
#[derive(Debug)]
pub struct DeliveryQueue {
    entries: FxHashMap<MessageKey, Entry>,
    max_resend_attempts: u32,
    next_generation: u64,
    next_seq: u64,
}

impl DeliveryQueue {
    /// Creates an empty queue allowing `max_resend_attempts` automatic
    /// resends after the first attempt.
    #[must_use]
    pub fn new(max_resend_attempts: u32) -> Self {
        Self {
            entries: FxHashMap::default(),
            max_resend_attempts,
            next_generation: 0,
            next_seq: 0,
        }
    }

    /// Total attempts allowed per automatic cycle.
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_resend_attempts.saturating_add(1)
    }

    /// Number of queued entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `key` is queued.
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &MessageKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Failed attempts recorded for `key` in its current cycle.
    #[must_use]
    pub fn failures(&self, key: &MessageKey) -> Option<u32> {
        self.entries.get(key).map(|entry| entry.failures)
    }

    /// Accepts a submission.
    ///
    /// A manual submission resets the attempt counter of an existing entry;
    /// an automatic one is coalesced into it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyMessage`] if the message has no text.
    pub fn enqueue(&mut self, message: OutboundMessage, manual: bool) -> Result<Enqueued> {
        if message.is_empty() {
            warn!(manual, "Refusing to queue an empty message");
            return Err(Error::EmptyMessage);
        }

        let key = message.key();

        if let Some(entry) = self.entries.get_mut(&key) {
            if !manual {
                debug!(key = %key, failures = entry.failures, "Coalesced into active retry cycle");
                return Ok(Enqueued::Coalesced(key));
            }
            debug!(key = %key, failures = entry.failures, "Manual retry resets attempt counter");
            entry.failures = 0;
            entry.message = message;
            return Ok(Enqueued::Ready(key));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key.clone(),
            Entry {
                message,
                failures: 0,
                generation: 0,
                seq,
            },
        );
        trace!(key = %key, manual, "Entry queued");
        Ok(Enqueued::Ready(key))
    }

    /// Starts an attempt for `key`.
    ///
    /// Stamps the entry with a new generation, which makes any resend timer
    /// scheduled earlier stale, and returns a copy of the message.
    pub fn begin_attempt(&mut self, key: &MessageKey) -> Option<OutboundMessage> {
        let entry = self.entries.get_mut(key)?;
        self.next_generation += 1;
        entry.generation = self.next_generation;
        Some(entry.message.clone())
    }

    /// Returns `true` if a timer carrying `generation` is still current.
    #[must_use]
    pub fn is_current(&self, key: &MessageKey, generation: u64) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Marks `key` delivered and removes it.
    pub fn complete(&mut self, key: &MessageKey) -> Option<OutboundMessage> {
        self.entries.remove(key).map(|entry| entry.message)
    }

    /// Gives up on `key` without spending the rest of its budget.
    pub fn abandon(&mut self, key: &MessageKey) -> Option<OutboundMessage> {
        let entry = self.entries.remove(key)?;
        debug!(key = %key, failures = entry.failures, "Entry abandoned");
        Some(entry.message)
    }

    /// Records a failed attempt for `key`.
    pub fn fail(&mut self, key: &MessageKey) -> Option<Failure> {
        let max_attempts = self.max_attempts();
        let entry = self.entries.get_mut(key)?;
        entry.failures = entry.failures.saturating_add(1);

        if entry.failures < max_attempts {
            return Some(Failure::Retry {
                attempt: entry.failures,
                max_attempts,
                generation: entry.generation,
            });
        }

        self.entries
            .remove(key)
            .map(|entry| Failure::Exhausted(entry.message))
    }

    /// Keys in submission order.
    #[must_use]
    pub fn keys(&self) -> Vec<MessageKey> {
        let mut keyed: Vec<_> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.seq, key.clone()))
            .collect();
        keyed.sort_unstable_by_key(|(seq, _)| *seq);
        keyed.into_iter().map(|(_, key)| key).collect()
    }

    /// Removes every entry, in submission order.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        let mut entries: Vec<_> = self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_unstable_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.message).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
