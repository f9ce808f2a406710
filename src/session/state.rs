//! Versioned session state and its transitions.
//!
//! Every user action is a method on [`SessionState`]. Actions that need a
//! network call return a command value tagged with the current generation;
//! the caller executes it and hands the outcome back to the matching
//! `complete_*` method, which drops it if the generation has moved on.

use anyhow::Result;
use std::fmt;

use super::error::SessionError;
use super::model::{ChatMessage, ChatSession, DetectionResult, ImageSource, RETRY_NOTICE};

/// Monotonic counter bumped on every image change and every clear.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Empty,
    ImageSelected,
    Detecting,
    Detected,
    DetectionFailed,
    ChatPending,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::ImageSelected => "image selected",
            Self::Detecting => "detecting",
            Self::Detected => "detected",
            Self::DetectionFailed => "detection failed",
            Self::ChatPending => "waiting for answer",
        };
        f.write_str(label)
    }
}

/// A detection request to execute.
#[derive(Debug, Clone)]
pub struct DetectCommand {
    pub generation: Generation,
    pub image: ImageSource,
}

/// A chat request to execute.
#[derive(Debug, Clone)]
pub struct ChatCommand {
    pub generation: Generation,
    pub plant_name: String,
    pub message: String,
}

/// What happened to a response handed back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// The response belonged to a superseded generation or request.
    Discarded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    generation: Generation,
    phase: Phase,
    image: Option<ImageSource>,
    detection: Option<DetectionResult>,
    chat: ChatSession,
    error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn generation(&self) -> Generation {
        self.generation
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn image(&self) -> Option<&ImageSource> {
        self.image.as_ref()
    }

    pub const fn detection(&self) -> Option<&DetectionResult> {
        self.detection.as_ref()
    }

    pub const fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// The user-visible detection error, if the last detection failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns `true` while a request is in flight.
    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Detecting | Phase::ChatPending)
    }

    pub const fn can_detect(&self) -> bool {
        self.image.is_some() && !self.is_busy()
    }

    pub fn can_chat(&self) -> bool {
        self.phase == Phase::Detected && self.chat.bound_plant().is_some()
    }

    /// Replaces the image and discards everything derived from the old one.
    pub fn set_image_source(&mut self, image: ImageSource) {
        self.generation += 1;
        self.phase = Phase::ImageSelected;
        self.image = Some(image);
        self.detection = None;
        self.chat = ChatSession::default();
        self.error = None;
    }

    /// Resets the session to empty. In-flight responses become stale.
    pub fn clear(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    /// Starts detection for the current image.
    ///
    /// Returns `Ok(None)` when a detection for this image is already running,
    /// so no duplicate request is issued.
    pub fn request_detection(&mut self) -> Result<Option<DetectCommand>, SessionError> {
        match self.phase {
            Phase::Detecting => return Ok(None),
            Phase::ChatPending => return Err(SessionError::ChatPending),
            _ => {}
        }

        let image = self.image.clone().ok_or(SessionError::NoImage)?;

        self.phase = Phase::Detecting;
        self.detection = None;
        self.chat = ChatSession::default();
        self.error = None;

        Ok(Some(DetectCommand {
            generation: self.generation,
            image,
        }))
    }

    /// Folds a detection outcome into the session.
    pub fn complete_detection(
        &mut self,
        generation: Generation,
        outcome: Result<DetectionResult>,
    ) -> Disposition {
        if !self.accepts(generation, Phase::Detecting) {
            return Disposition::Discarded;
        }

        match outcome {
            Ok(result) => {
                self.chat = ChatSession::seeded_from(&result);
                self.detection = Some(result);
                self.phase = Phase::Detected;
            }
            Err(err) => {
                self.error = Some(format!("{err:#}"));
                self.phase = Phase::DetectionFailed;
            }
        }

        Disposition::Applied
    }

    /// Appends the user's message and starts a chat request about the bound plant.
    ///
    /// Nothing is mutated when the message is rejected.
    pub fn send_chat_message(&mut self, text: &str) -> Result<ChatCommand, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        match self.phase {
            Phase::Empty => return Err(SessionError::NoImage),
            Phase::Detecting => return Err(SessionError::DetectionPending),
            Phase::ChatPending => return Err(SessionError::ChatPending),
            Phase::ImageSelected | Phase::DetectionFailed | Phase::Detected => {}
        }

        let plant_name = self
            .chat
            .bound_plant()
            .filter(|_| self.phase == Phase::Detected)
            .ok_or(SessionError::NoPlant)?
            .to_string();

        self.chat.push(ChatMessage::user(text));
        self.phase = Phase::ChatPending;

        Ok(ChatCommand {
            generation: self.generation,
            plant_name,
            message: text.to_string(),
        })
    }

    /// Folds a chat outcome into the transcript and leaves chat-pending.
    pub fn complete_chat(&mut self, generation: Generation, outcome: Result<String>) -> Disposition {
        if !self.accepts(generation, Phase::ChatPending) {
            return Disposition::Discarded;
        }

        let reply = outcome.unwrap_or_else(|_| RETRY_NOTICE.to_string());
        self.chat.push(ChatMessage::assistant(reply));
        self.phase = Phase::Detected;

        Disposition::Applied
    }

    fn accepts(&self, generation: Generation, expected: Phase) -> bool {
        generation == self.generation && self.phase == expected
    }
}
