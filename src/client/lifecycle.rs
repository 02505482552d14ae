//! Connection state machine.
//!
//! Pure bookkeeping: no I/O, no timers. The event loop asks it whether to
//! open a channel and feeds it the outcome; every transition method returns
//! whether the event was accepted so late events from an older channel can
//! be ignored.
//!
//! # States
//!
//! ```text
//! Idle ──connect──► Connecting ──open──► Connected
//!                     ▲   │                  │
//!        reconnect due│   │error        close│error
//!                     │   ▼                  ▼
//!                   Disconnected ◄───────────┘
//!
//! any ──close()──► Closed (terminal)
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// ConnectionState
// ============================================================================

/// Liveness of the duplex connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Never connected.
    #[default]
    Idle,
    /// A channel is being opened.
    Connecting,
    /// The channel is open.
    Connected,
    /// The channel dropped; a reconnect is scheduled.
    Disconnected,
    /// Shut down by the caller. Terminal.
    Closed,
}

impl ConnectionState {
    /// Returns `true` if the channel is open.
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }

    /// Returns `true` once the client has been shut down.
    #[inline]
    #[must_use]
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("Idle"),
            Self::Connecting => f.write_str("Connecting"),
            Self::Connected => f.write_str("Connected"),
            Self::Disconnected => f.write_str("Disconnected"),
            Self::Closed => f.write_str("Closed"),
        }
    }
}

// ============================================================================
// ConnectionLifecycle
// ============================================================================

/// Tracks the state of the single logical connection.
///
/// `generation` increases by one for every channel opened and tags all
/// events that belong to that channel.
#[derive(Debug, Default)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
    generation: u64,
    reconnect_attempts: u32,
}

impl ConnectionLifecycle {
    /// Creates a lifecycle in [`ConnectionState::Idle`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns the generation of the current (or last) channel.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of reconnects since the last successful open.
    #[inline]
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Starts a connection attempt.
    ///
    /// Returns the generation to open, or `None` if a channel is already
    /// open or opening, or the lifecycle is closed.
    pub fn connect(&mut self) -> Option<u64> {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Closed => {
                None
            }
            ConnectionState::Idle | ConnectionState::Disconnected => {
                self.generation += 1;
                self.state = ConnectionState::Connecting;
                Some(self.generation)
            }
        }
    }

    /// Records that the channel of `generation` opened.
    pub fn on_open(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state != ConnectionState::Connecting {
            return false;
        }
        self.state = ConnectionState::Connected;
        self.reconnect_attempts = 0;
        true
    }

    /// Records that the channel of `generation` closed or failed.
    ///
    /// Returns `true` if this moved the lifecycle to `Disconnected`; the
    /// caller then schedules a reconnect.
    pub fn on_close(&mut self, generation: u64) -> bool {
        if generation != self.generation
            || !matches!(
                self.state,
                ConnectionState::Connecting | ConnectionState::Connected
            )
        {
            return false;
        }
        self.state = ConnectionState::Disconnected;
        true
    }

    /// Handles a reconnect timer scheduled after `generation` dropped.
    ///
    /// Returns the generation to open, or `None` if the timer is stale.
    pub fn on_reconnect_due(&mut self, generation: u64) -> Option<u64> {
        if generation != self.generation || self.state != ConnectionState::Disconnected {
            return None;
        }
        self.reconnect_attempts = self.reconnect_attempts.saturating_add(1);
        self.connect()
    }

    /// Moves to `Closed`. Returns `false` if already closed.
    pub fn close(&mut self) -> bool {
        if self.state == ConnectionState::Closed {
            return false;
        }
        self.state = ConnectionState::Closed;
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_connect_is_idempotent_while_connecting() {
        let mut lifecycle = ConnectionLifecycle::new();
        assert_eq!(lifecycle.connect(), Some(1));
        assert_eq!(lifecycle.connect(), None);
        assert_eq!(lifecycle.state(), ConnectionState::Connecting);
        assert_eq!(lifecycle.generation(), 1);
    }

    #[test]
    fn test_open_close_reconnect_cycle() {
        let mut lifecycle = ConnectionLifecycle::new();
        let first = lifecycle.connect().expect("first attempt");
        assert!(lifecycle.on_open(first));
        assert!(lifecycle.state().is_connected());
        assert_eq!(lifecycle.connect(), None);

        assert!(lifecycle.on_close(first));
        assert_eq!(lifecycle.state(), ConnectionState::Disconnected);

        let second = lifecycle.on_reconnect_due(first).expect("reconnect");
        assert_eq!(second, 2);
        assert_eq!(lifecycle.reconnect_attempts(), 1);
        assert!(lifecycle.on_open(second));
        assert_eq!(lifecycle.reconnect_attempts(), 0);
    }

    #[test]
    fn test_open_failure_goes_to_disconnected() {
        let mut lifecycle = ConnectionLifecycle::new();
        let generation = lifecycle.connect().expect("attempt");
        assert!(lifecycle.on_close(generation));
        assert_eq!(lifecycle.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut lifecycle = ConnectionLifecycle::new();
        let first = lifecycle.connect().expect("attempt");
        assert!(lifecycle.on_close(first));

        // Explicit connect supersedes the pending reconnect timer.
        let second = lifecycle.connect().expect("explicit reconnect");
        assert_eq!(lifecycle.on_reconnect_due(first), None);
        assert!(!lifecycle.on_open(first));
        assert!(!lifecycle.on_close(first));
        assert!(lifecycle.on_open(second));
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut lifecycle = ConnectionLifecycle::new();
        let generation = lifecycle.connect().expect("attempt");
        assert!(lifecycle.close());
        assert!(!lifecycle.close());

        assert_eq!(lifecycle.connect(), None);
        assert!(!lifecycle.on_open(generation));
        assert!(!lifecycle.on_close(generation));
        assert_eq!(lifecycle.on_reconnect_due(generation), None);
        assert!(lifecycle.state().is_closed());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Connect,
        Open { stale: bool },
        Close { stale: bool },
        ReconnectDue { stale: bool },
        Shutdown,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => Just(Op::Connect),
            4 => any::<bool>().prop_map(|stale| Op::Open { stale }),
            4 => any::<bool>().prop_map(|stale| Op::Close { stale }),
            4 => any::<bool>().prop_map(|stale| Op::ReconnectDue { stale }),
            1 => Just(Op::Shutdown),
        ]
    }

    proptest! {
        #[test]
        fn prop_connected_always_separated_by_disconnected(ops in prop::collection::vec(op(), 0..200)) {
            let mut lifecycle = ConnectionLifecycle::new();
            let mut observed = Vec::new();
            let mut in_flight = 0usize;

            for op in ops {
                let before = lifecycle.state();
                let current = lifecycle.generation();
                let target = |stale: bool| if stale { current.saturating_sub(1) } else { current };

                match op {
                    Op::Connect => {
                        if lifecycle.connect().is_some() {
                            in_flight += 1;
                        }
                    }
                    Op::Open { stale } => {
                        lifecycle.on_open(target(stale));
                    }
                    Op::Close { stale } => {
                        if lifecycle.on_close(target(stale)) {
                            in_flight = in_flight.saturating_sub(1);
                        }
                    }
                    Op::ReconnectDue { stale } => {
                        if lifecycle.on_reconnect_due(target(stale)).is_some() {
                            in_flight += 1;
                        }
                    }
                    Op::Shutdown => {
                        lifecycle.close();
                        in_flight = 0;
                    }
                }

                let after = lifecycle.state();
                if after != before {
                    observed.push(after);
                }
                if before.is_closed() {
                    prop_assert!(after.is_closed());
                }
                prop_assert!(in_flight <= 1);
            }

            let mut last_link_state = None;
            for state in observed {
                if matches!(state, ConnectionState::Connected | ConnectionState::Disconnected) {
                    prop_assert!(
                        !(state == ConnectionState::Connected
                            && last_link_state == Some(ConnectionState::Connected)),
                        "two Connected states without Disconnected in between"
                    );
                    last_link_state = Some(state);
                }
            }
        }
    }
}
