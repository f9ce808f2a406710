//! Capture/detect/chat session state machine.
//!
//! ```text
//! empty ─▶ image-selected ─▶ detecting ─▶ detected ⇄ chat-pending
//!                                   └──▶ detection-failed
//! ```
//!
//! [`SessionState`] holds the transitions and the generation counter used to
//! drop stale responses. [`SessionController`] executes the requests those
//! transitions produce against a [`PlantService`].

mod controller;
mod error;
mod model;
mod service;
mod state;

pub use controller::{Completion, SessionController, Settled};
pub use error::SessionError;
pub use model::{
    ChatMessage, ChatSession, DetectionResult, ImageSource, NOT_AVAILABLE,
    NOT_IDENTIFIED_MESSAGE, PlantRecord, RETRY_NOTICE, Role, SourceKind, UNBOUND_PLANT_NAME,
    UNKNOWN_PLANT_NAME, greeting, sniff_mime,
};
pub use service::PlantService;
pub use state::{ChatCommand, DetectCommand, Disposition, Generation, Phase, SessionState};
