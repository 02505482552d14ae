//! Recorder control commands.
//!
//! Sent to the live-transcription service's command server. Commands are
//! fire-and-forget; the server answers each one with a
//! [`CommandReply`](super::CommandReply).
//!
//! # Format
//!
//! ```json
//! { "command": "change_input_device", "args": { "device_id": 2 } }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::error::Result;

// ============================================================================
// ControlCommand
// ============================================================================

/// A command for the transcription backend's recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum ControlCommand {
    /// List available audio input devices.
    ListInputDevices,
    /// Switch the recorder to another input device.
    ChangeInputDevice {
        /// Device index as reported by `ListInputDevices`.
        device_id: u32,
    },
    /// Start a new recording session.
    StartRecording,
    /// Stop the current recording session.
    StopRecording,
    /// Pause the current recording session.
    PauseRecording,
    /// Resume a paused recording session.
    ResumeRecording,
}

impl ControlCommand {
    /// Serializes the command to its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn wire(command: &ControlCommand) -> Value {
        serde_json::from_str(&command.encode().expect("encode")).expect("json")
    }

    #[test]
    fn test_unit_commands_have_no_args() {
        assert_eq!(
            wire(&ControlCommand::StartRecording),
            json!({ "command": "start_recording" })
        );
        assert_eq!(
            wire(&ControlCommand::StopRecording),
            json!({ "command": "stop_recording" })
        );
    }

    #[test]
    fn test_change_input_device_args() {
        assert_eq!(
            wire(&ControlCommand::ChangeInputDevice { device_id: 2 }),
            json!({ "command": "change_input_device", "args": { "device_id": 2 } })
        );
    }
}
