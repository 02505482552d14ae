//! Client event loop.
//!
//! A single tokio task owns the connection, the delivery queue and the
//! router. It handles, one at a time and in arrival order:
//!
//! - Commands from [`Client`](super::Client) handles
//! - Link events (opened, open failed, frame, closed)
//! - Timer events (reconnect due, resend due)
//!
//! Timers and the link reader are separate tasks that only post events back
//! to the loop, so waiting never blocks it. Every event carries the
//! generation it belongs to; events from an older channel or an older retry
//! cycle are ignored.
//!
//! Writes are the only place the loop awaits the link itself. Each one is
//! bounded by the configured send timeout and abandoned as soon as a handle
//! starts closing the client. A write that times out takes the link down
//! with it.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::identifiers::MessageKey;
use crate::protocol::{ControlCommand, OutboundMessage};
use crate::status::{StatusChannel, StatusEvent};
use crate::transport::{Connector, FrameSink, FrameStream, Link};

use super::lifecycle::{ConnectionLifecycle, ConnectionState};
use super::queue::{DeliveryQueue, Enqueued, Failure};
use super::router::InboundRouter;

// ============================================================================
// ClientCommand
// ============================================================================

/// Requests from client handles.
pub(crate) enum ClientCommand {
    /// Open the connection if it is not open or opening.
    Connect,
    /// Queue a message for delivery.
    Submit {
        message: OutboundMessage,
        manual: bool,
    },
    /// Write a control command once, without retry.
    Control {
        command: ControlCommand,
        response_tx: oneshot::Sender<Result<()>>,
    },
    /// Report the queue length.
    PendingCount(oneshot::Sender<usize>),
    /// Shut down and stop the loop.
    Close(oneshot::Sender<()>),
}

// ============================================================================
// LoopEvent
// ============================================================================

/// Events posted back to the loop by its own tasks.
enum LoopEvent {
    Opened { generation: u64, link: Link },
    OpenFailed { generation: u64, error: Error },
    Frame { generation: u64, text: String },
    LinkClosed { generation: u64, error: Option<Error> },
    ReconnectDue { generation: u64 },
    ResendDue { key: MessageKey, generation: u64 },
}

// ============================================================================
// EventLoop
// ============================================================================

/// State owned by the loop task.
pub(crate) struct EventLoop {
    config: ClientConfig,
    url: Url,
    connector: Arc<dyn Connector>,
    status: StatusChannel,
    state_tx: watch::Sender<ConnectionState>,
    closing_rx: watch::Receiver<bool>,
    events_tx: mpsc::UnboundedSender<LoopEvent>,
    events_rx: mpsc::UnboundedReceiver<LoopEvent>,

    lifecycle: ConnectionLifecycle,
    queue: DeliveryQueue,
    router: InboundRouter,

    sink: Option<FrameSink>,
    opener: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
    reconnect_timer: Option<JoinHandle<()>>,
    resend_timers: FxHashMap<MessageKey, JoinHandle<()>>,
}

impl EventLoop {
    /// Creates the loop state. Nothing runs until [`run`](Self::run).
    pub(crate) fn new(
        config: ClientConfig,
        url: Url,
        connector: Arc<dyn Connector>,
        status: StatusChannel,
        state_tx: watch::Sender<ConnectionState>,
        closing_rx: watch::Receiver<bool>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let queue = DeliveryQueue::new(config.max_resend_attempts);
        let router = InboundRouter::new(config.service);

        Self {
            config,
            url,
            connector,
            status,
            state_tx,
            closing_rx,
            events_tx,
            events_rx,
            lifecycle: ConnectionLifecycle::new(),
            queue,
            router,
            sink: None,
            opener: None,
            reader: None,
            reconnect_timer: None,
            resend_timers: FxHashMap::default(),
        }
    }

    /// Runs until a `Close` command arrives or every handle is dropped.
    pub(crate) async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<ClientCommand>) {
        debug!(url = %self.url, service = %self.config.service, "Event loop started");

        loop {
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(ClientCommand::Close(done_tx)) => {
                            self.shutdown().await;
                            let _ = done_tx.send(());
                            break;
                        }

                        Some(command) => self.handle_command(command).await,

                        None => {
                            debug!("All client handles dropped");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event).await;
                }
            }
        }

        debug!("Event loop terminated");
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn handle_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::Connect => self.connect(),

            ClientCommand::Submit { message, manual } => self.submit(message, manual).await,

            ClientCommand::Control {
                command,
                response_tx,
            } => {
                let result = match command.encode() {
                    Ok(text) => self.transmit(text).await,
                    Err(e) => Err(e),
                };
                if let Err(ref e) = result {
                    warn!(?command, error = %e, "Control command not sent");
                }
                let _ = response_tx.send(result);
            }

            ClientCommand::PendingCount(tx) => {
                let _ = tx.send(self.queue.len());
            }

            // Handled by `run`
            ClientCommand::Close(_) => {}
        }
    }

    // ========================================================================
    // Connection
    // ========================================================================

    fn connect(&mut self) {
        match self.lifecycle.connect() {
            Some(generation) => self.open_link(generation),
            None => debug!(state = %self.lifecycle.state(), "Connect ignored"),
        }
    }

    fn open_link(&mut self, generation: u64) {
        if let Some(timer) = self.reconnect_timer.take() {
            timer.abort();
        }
        self.publish_state();

        info!(
            url = %self.url,
            generation,
            reconnects = self.lifecycle.reconnect_attempts(),
            "Connecting"
        );

        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        let events_tx = self.events_tx.clone();

        self.opener = Some(tokio::spawn(async move {
            let event = match connector.open(&url).await {
                Ok(link) => LoopEvent::Opened { generation, link },
                Err(error) => LoopEvent::OpenFailed { generation, error },
            };
            let _ = events_tx.send(event);
        }));
    }

    async fn on_opened(&mut self, generation: u64, link: Link) {
        if !self.lifecycle.on_open(generation) {
            debug!(generation, "Dropping link from superseded attempt");
            return;
        }

        let Link { sink, stream } = link;
        self.sink = Some(sink);
        self.opener = None;
        self.reader = Some(tokio::spawn(read_link(
            generation,
            stream,
            self.events_tx.clone(),
        )));
        self.publish_state();

        info!(url = %self.url, generation, "Connected");
        self.status.notify(StatusEvent::Connection { connected: true });

        if self.config.drain_on_reconnect && !self.queue.is_empty() {
            debug!(pending = self.queue.len(), "Draining queue after connect");
            for key in self.queue.keys() {
                self.attempt(key).await;
            }
        }
    }

    fn on_disconnected(&mut self, generation: u64, error: Option<Error>) {
        if !self.lifecycle.on_close(generation) {
            trace!(generation, "Ignoring close of superseded link");
            return;
        }

        self.sink = None;
        self.opener = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.publish_state();

        match error {
            Some(e) => warn!(url = %self.url, generation, error = %e, "Disconnected"),
            None => info!(url = %self.url, generation, "Disconnected"),
        }
        self.status.notify(StatusEvent::Connection { connected: false });

        let delay = self.config.reconnect_delay();
        let events_tx = self.events_tx.clone();
        debug!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");

        self.reconnect_timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = events_tx.send(LoopEvent::ReconnectDue { generation });
        }));
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.lifecycle.state());
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    async fn submit(&mut self, message: OutboundMessage, manual: bool) {
        match self.queue.enqueue(message, manual) {
            Ok(Enqueued::Ready(key)) => self.attempt(key).await,
            Ok(Enqueued::Coalesced(_)) => {}
            Err(e) => warn!(error = %e, "Submission rejected"),
        }
    }

    async fn attempt(&mut self, key: MessageKey) {
        let Some(message) = self.queue.begin_attempt(&key) else {
            return;
        };
        if let Some(timer) = self.resend_timers.remove(&key) {
            timer.abort();
        }

        let result = match message.encode() {
            Ok(text) => self.transmit(text).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.queue.complete(&key);
                debug!(key = %key, "Message sent");
                self.status.notify(StatusEvent::SendSuccess { text: message.text });
            }

            Err(e) if !e.is_recoverable() => {
                if let Some(message) = self.queue.abandon(&key) {
                    error!(key = %key, error = %e, "Send failed permanently, message not sent");
                    self.status.notify(StatusEvent::SendFailed { message });
                }
            }

            Err(e) => self.on_attempt_failed(key, e),
        }
    }

    fn on_attempt_failed(&mut self, key: MessageKey, error: Error) {
        match self.queue.fail(&key) {
            Some(Failure::Retry {
                attempt,
                max_attempts,
                generation,
            }) => {
                warn!(key = %key, attempt, max_attempts, error = %error, "Send failed, retrying");
                self.status.notify(StatusEvent::Retrying {
                    text: key.as_str().to_owned(),
                    attempt,
                    max_attempts,
                });

                let delay = self.config.resend_delay();
                let events_tx = self.events_tx.clone();
                let timer_key = key.clone();
                let timer = tokio::spawn(async move {
                    sleep(delay).await;
                    let _ = events_tx.send(LoopEvent::ResendDue {
                        key: timer_key,
                        generation,
                    });
                });
                self.resend_timers.insert(key, timer);
            }

            Some(Failure::Exhausted(message)) => {
                error!(key = %key, error = %error, "Maximum resend attempts reached, message not sent");
                self.status.notify(StatusEvent::SendFailed { message });
            }

            None => {}
        }
    }

    async fn on_resend_due(&mut self, key: MessageKey, generation: u64) {
        if !self.queue.is_current(&key, generation) {
            debug!(key = %key, generation, "Ignoring stale resend timer");
            return;
        }
        self.resend_timers.remove(&key);
        self.attempt(key).await;
    }

    async fn transmit(&mut self, text: String) -> Result<()> {
        if !self.lifecycle.state().is_connected() {
            return Err(Error::NotConnected);
        }
        let sink = self.sink.as_mut().ok_or(Error::NotConnected)?;

        trace!(frame = %text, "Sending frame");
        let limit = self.config.send_timeout();
        let mut closing = self.closing_rx.clone();
        let written = tokio::select! {
            biased;
            result = timeout(limit, sink.send(text)) => Some(result),
            _ = closing.wait_for(|raised| *raised) => None,
        };

        match written {
            Some(Ok(result)) => result,

            Some(Err(_)) => {
                let timeout_ms = self.config.send_timeout_ms;
                let generation = self.lifecycle.generation();
                self.on_disconnected(generation, Some(Error::send_timeout(timeout_ms)));
                Err(Error::send_timeout(timeout_ms))
            }

            // Dropped without a closing handshake
            None => {
                debug!("Write abandoned, client closing");
                self.sink = None;
                Err(Error::ConnectionClosed)
            }
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    async fn handle_event(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Opened { generation, link } => self.on_opened(generation, link).await,

            LoopEvent::OpenFailed { generation, error } => {
                self.on_disconnected(generation, Some(error));
            }

            LoopEvent::Frame { generation, text } => self.on_frame(generation, &text),

            LoopEvent::LinkClosed { generation, error } => {
                self.on_disconnected(generation, error);
            }

            LoopEvent::ReconnectDue { generation } => {
                self.reconnect_timer = None;
                match self.lifecycle.on_reconnect_due(generation) {
                    Some(next) => self.open_link(next),
                    None => trace!(generation, "Ignoring stale reconnect timer"),
                }
            }

            LoopEvent::ResendDue { key, generation } => self.on_resend_due(key, generation).await,
        }
    }

    fn on_frame(&mut self, generation: u64, text: &str) {
        if generation != self.lifecycle.generation() || !self.lifecycle.state().is_connected() {
            trace!(generation, "Ignoring frame from superseded link");
            return;
        }

        trace!(frame = %text, "Received frame");
        match self.router.route(text) {
            Ok(Some(event)) => self.status.notify(event),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Dropping malformed frame"),
        }
    }

    // ========================================================================
    // Shutdown
    // ========================================================================

    async fn shutdown(&mut self) {
        let was_connected = self.lifecycle.state().is_connected();
        if !self.lifecycle.close() {
            return;
        }

        for handle in [
            self.opener.take(),
            self.reader.take(),
            self.reconnect_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
        for (_, timer) in self.resend_timers.drain() {
            timer.abort();
        }

        if let Some(mut sink) = self.sink.take() {
            if timeout(self.config.send_timeout(), sink.close()).await.is_err() {
                warn!(url = %self.url, "Link did not close in time, dropping it");
            }
        }
        self.publish_state();

        if was_connected {
            self.status.notify(StatusEvent::Connection { connected: false });
        }

        // Fail whatever is still queued
        let pending = self.queue.drain();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Failed pending messages on shutdown");
        }
        for message in pending {
            self.status.notify(StatusEvent::SendFailed { message });
        }

        info!(url = %self.url, "Client closed");
    }
}

// ============================================================================
// Link Reader
// ============================================================================

/// Forwards inbound frames until the link ends.
async fn read_link(
    generation: u64,
    mut stream: FrameStream,
    events_tx: mpsc::UnboundedSender<LoopEvent>,
) {
    let error = loop {
        match stream.next().await {
            Some(Ok(text)) => {
                if events_tx.send(LoopEvent::Frame { generation, text }).is_err() {
                    return;
                }
            }

            Some(Err(e)) if !e.is_connection_error() => {
                warn!(error = %e, "Dropping undecodable frame");
            }

            Some(Err(e)) => break Some(e),

            None => break None,
        }
    };

    let _ = events_tx.send(LoopEvent::LinkClosed { generation, error });
}
