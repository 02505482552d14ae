//! Inbound frame routing.
//!
//! Decodes each text frame for the configured [`Service`] and turns it into
//! at most one [`StatusEvent`]. Payload content is passed through untouched.
//!
//! # Transcription Sessions
//!
//! Transcription updates are session-scoped. A `ready` frame makes its
//! session id current; later updates are forwarded only if they carry that
//! id, so text from a previous recording never reaches the observer.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use tracing::debug;

use crate::config::Service;
use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::{ChatReply, CommandReply, TranscriptionFrame, TranscriptionStatus};
use crate::status::StatusEvent;

// ============================================================================
// Constants
// ============================================================================

/// Frame type marker of transcription updates.
const TRANSCRIPTION_FRAME_TYPE: &str = "transcription";

// ============================================================================
// Types
// ============================================================================

/// Anything the transcription service may send.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptionInbound {
    Update(TranscriptionFrame),
    Reply(CommandReply),
}

// ============================================================================
// InboundRouter
// ============================================================================

/// Decodes inbound frames into status events.
#[derive(Debug, Clone)]
pub struct InboundRouter {
    service: Service,
    session: Option<SessionId>,
}

impl InboundRouter {
    /// Creates a router for `service`.
    #[inline]
    #[must_use]
    pub fn new(service: Service) -> Self {
        Self {
            service,
            session: None,
        }
    }

    /// Returns the session id of the last `ready` frame.
    #[inline]
    #[must_use]
    pub fn current_session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Routes one frame.
    ///
    /// Returns `Ok(None)` for frames that decode but must not be forwarded.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if a chat frame is not a valid reply
    /// - [`Error::Protocol`] if a transcription frame has an unknown shape
    pub fn route(&mut self, text: &str) -> Result<Option<StatusEvent>> {
        match self.service {
            Service::Chat => Self::route_chat(text).map(Some),
            Service::Transcription => self.route_transcription(text),
        }
    }

    fn route_chat(text: &str) -> Result<StatusEvent> {
        let reply: ChatReply = serde_json::from_str(text)?;
        Ok(StatusEvent::ReceiveMessage {
            kind: reply.kind,
            text: reply.message,
            session_id: reply.session_id,
        })
    }

    fn route_transcription(&mut self, text: &str) -> Result<Option<StatusEvent>> {
        let inbound: TranscriptionInbound = serde_json::from_str(text)
            .map_err(|_| Error::protocol("unrecognised transcription frame"))?;

        match inbound {
            TranscriptionInbound::Update(frame) => self.route_update(frame),
            TranscriptionInbound::Reply(reply) => Ok(Some(StatusEvent::CommandReply {
                success: reply.is_success(),
                message: reply.message,
                devices: reply.devices,
            })),
        }
    }

    fn route_update(&mut self, frame: TranscriptionFrame) -> Result<Option<StatusEvent>> {
        if frame.frame_type != TRANSCRIPTION_FRAME_TYPE {
            return Err(Error::protocol(format!(
                "unexpected frame type: {}",
                frame.frame_type
            )));
        }

        let data = frame.data;

        if data.status == TranscriptionStatus::Ready {
            debug!(session_id = %data.session_id, "Transcription session ready");
            self.session = Some(data.session_id.clone());
        } else if self.session.as_ref() != Some(&data.session_id) {
            debug!(
                session_id = %data.session_id,
                current = ?self.session,
                "Dropping update from stale session"
            );
            return Ok(None);
        }

        Ok(Some(StatusEvent::Transcription {
            session_id: data.session_id,
            status: data.status,
            text: data.text,
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
