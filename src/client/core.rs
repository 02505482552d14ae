//! Client handle.
//!
//! [`Client`] is a cheap, cloneable handle to a running event loop. All
//! methods are non-blocking apart from the ones that wait for an answer
//! from the loop.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::warn;
use url::Url;

use crate::config::{ClientConfig, Service};
use crate::error::{Error, Result};
use crate::protocol::{ControlCommand, OutboundMessage};
use crate::status::{Observer, StatusChannel, StatusEvent, channel_observer};
use crate::transport::{Connector, WsConnector};

use super::event_loop::{ClientCommand, EventLoop};
use super::lifecycle::ConnectionState;

// ============================================================================
// Client
// ============================================================================

/// Handle to a resilient session with one backend service.
///
/// Dropping the last handle shuts the session down, as does [`close`].
///
/// # Example
///
/// ```no_run
/// use rubberduck_link::{Client, ClientConfig, OutboundMessage, Result};
///
/// # async fn example() -> Result<()> {
/// let client = Client::spawn(ClientConfig::default())?;
/// let mut events = client.subscribe();
///
/// client.connect()?;
/// client.submit(OutboundMessage::new("What does this function do?"))?;
///
/// while let Some(event) = events.recv().await {
///     println!("{}: {:?}", event.wire_name(), event);
/// }
/// # Ok(())
/// # }
/// ```
///
/// [`close`]: Client::close
#[derive(Clone)]
pub struct Client {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<ClientCommand>,
    /// Connection state published by the event loop.
    state_rx: watch::Receiver<ConnectionState>,
    /// Raised by `close` so the loop abandons a write in progress.
    closing_tx: Arc<watch::Sender<bool>>,
    /// Observer slot (shared with the event loop).
    status: StatusChannel,
    /// Resolved endpoint.
    url: Url,
    /// Backend service.
    service: Service,
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    /// Spawns a client that connects over WebSocket.
    ///
    /// The client starts `Idle`; call [`connect`](Self::connect) to open the
    /// link.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: ClientConfig) -> Result<Self> {
        Self::with_connector(config, WsConnector::new())
    }

    /// Spawns a client that opens links through `connector`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn with_connector<C: Connector>(config: ClientConfig, connector: C) -> Result<Self> {
        config.validate()?;
        let url = config.endpoint()?;
        let service = config.service;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (closing_tx, closing_rx) = watch::channel(false);
        let status = StatusChannel::new();

        let event_loop = EventLoop::new(
            config,
            url.clone(),
            Arc::new(connector),
            status.clone(),
            state_tx,
            closing_rx,
        );
        tokio::spawn(event_loop.run(command_rx));

        Ok(Self {
            command_tx,
            state_rx,
            closing_tx: Arc::new(closing_tx),
            status,
            url,
            service,
        })
    }
}

// ============================================================================
// Client - Connection
// ============================================================================

impl Client {
    /// Opens the link unless it is already open or opening.
    ///
    /// Once opened, the link is kept alive until [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the client has been closed.
    pub fn connect(&self) -> Result<()> {
        self.send_command(ClientCommand::Connect)
    }

    /// Returns the current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns `true` if the link is open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Waits until the connection reaches `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the event loop stops first.
    pub async fn wait_for_state(&self, state: ConnectionState) -> Result<()> {
        let mut state_rx = self.state_rx.clone();
        state_rx
            .wait_for(|current| *current == state)
            .await
            .map(|_| ())
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Shuts the session down.
    ///
    /// Abandons a write in progress, cancels the pending reconnect and
    /// resend timers, closes the link and reports every still-queued message
    /// as `SendFailed`. No reconnect happens afterwards. Calling it again is
    /// a no-op.
    pub async fn close(&self) -> Result<()> {
        self.closing_tx.send_replace(true);
        let (done_tx, done_rx) = oneshot::channel();
        if self.command_tx.send(ClientCommand::Close(done_tx)).is_err() {
            return Ok(());
        }
        let _ = done_rx.await;
        Ok(())
    }

    /// Returns the endpoint this client talks to.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the backend service.
    #[inline]
    #[must_use]
    pub fn service(&self) -> Service {
        self.service
    }
}

// ============================================================================
// Client - Delivery
// ============================================================================

impl Client {
    /// Submits a message for delivery.
    ///
    /// The outcome is reported to the observer: `SendSuccess`, or
    /// `Retrying` followed eventually by `SendSuccess` or `SendFailed`. A
    /// message whose text matches one already in flight is coalesced into
    /// it.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyMessage`] if the message has no text
    /// - [`Error::ConnectionClosed`] if the client has been closed
    pub fn submit(&self, message: OutboundMessage) -> Result<()> {
        self.submit_message(message, false)
    }

    /// Resubmits a message on the user's request.
    ///
    /// Resets the attempt counter, so a message reported as `SendFailed` gets
    /// a fresh set of automatic attempts. There is no limit on manual
    /// retries.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyMessage`] if the message has no text
    /// - [`Error::ConnectionClosed`] if the client has been closed
    pub fn retry(&self, message: OutboundMessage) -> Result<()> {
        self.submit_message(message, true)
    }

    fn submit_message(&self, message: OutboundMessage, manual: bool) -> Result<()> {
        if message.is_empty() {
            warn!(manual, "Ignoring empty message");
            return Err(Error::EmptyMessage);
        }
        self.send_command(ClientCommand::Submit { message, manual })
    }

    /// Sends a recorder control command once.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the link is not open
    /// - [`Error::ConnectionClosed`] if the client has been closed
    /// - the transport error if the write fails
    pub async fn send_control(&self, command: ControlCommand) -> Result<()> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send_command(ClientCommand::Control {
            command,
            response_tx,
        })?;
        response_rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Returns the number of messages awaiting delivery.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the client has been closed.
    pub async fn pending_count(&self) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        self.send_command(ClientCommand::PendingCount(tx))?;
        Ok(rx.await?)
    }

    fn send_command(&self, command: ClientCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::ConnectionClosed)
    }
}

// ============================================================================
// Client - Observer
// ============================================================================

impl Client {
    /// Registers the status observer, replacing any previous one.
    pub fn set_observer(&self, observer: Observer) {
        self.status.set_observer(observer);
    }

    /// Removes the status observer. Later events are dropped.
    pub fn clear_observer(&self) {
        self.status.clear_observer();
    }

    /// Registers a channel observer and returns its receiving end.
    ///
    /// Replaces any previous observer.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StatusEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.status.set_observer(channel_observer(tx));
        rx
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url.as_str())
            .field("service", &self.service)
            .field("state", &self.state())
            .finish()
    }
}
