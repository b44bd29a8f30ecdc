//! Generation progress wire format and parser.
//!
//! The generation endpoint sends one JSON object per text frame:
//! `{"level": 5, "status": "solving", "percentage": 62.5, "message": "..."}`.
//! `level` is present only on level-progress messages; terminal messages
//! carry `status` `"success"` or `"error"` and an optional `message`.

use serde::Deserialize;
use timetabler_core::generation::{GenerationEvent, LevelProgress, STATUS_ERROR, STATUS_SUCCESS};
use timetabler_core::types::{DbId, Level};

/// Raw progress message as sent by the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressMessage {
    #[serde(default)]
    pub level: Option<Level>,
    pub status: String,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    /// Echoed on the success message; not needed by the client.
    #[serde(default)]
    pub timetable_id: Option<DbId>,
}

impl ProgressMessage {
    /// Interpret the raw message.
    ///
    /// Terminal statuses win over a `level` field. A level message must
    /// carry a percentage, which is clamped to 0-100.
    pub fn into_event(self) -> Result<GenerationEvent, MessageError> {
        let event = match self.status.as_str() {
            STATUS_SUCCESS => GenerationEvent::Success {
                message: self.message,
            },
            STATUS_ERROR => GenerationEvent::Error {
                message: self.message,
            },
            _ => match self.level {
                Some(level) => {
                    let percentage = self
                        .percentage
                        .ok_or(MessageError::MissingPercentage { level })?;
                    GenerationEvent::Level(LevelProgress {
                        level,
                        status: self.status,
                        percentage: percentage.clamp(0.0, 100.0),
                        message: self.message.unwrap_or_default(),
                    })
                }
                None => GenerationEvent::Notice {
                    status: self.status,
                    message: self.message,
                },
            },
        };
        Ok(event)
    }
}

/// A text frame that is not a usable progress message.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Malformed progress message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Progress message for level {level} has no percentage")]
    MissingPercentage { level: Level },
}

/// Parse a generation text frame into a typed event.
///
/// Callers should log the error and keep waiting for further frames.
pub fn parse_message(text: &str) -> Result<GenerationEvent, MessageError> {
    serde_json::from_str::<ProgressMessage>(text)?.into_event()
}
