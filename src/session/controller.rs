use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::SessionError;
use super::model::{DetectionResult, ImageSource};
use super::service::PlantService;
use super::state::{Disposition, Generation, SessionState};
use crate::camera::{CameraSession, CommandStream, MediaStream};

/// A response from a spawned request, tagged with the generation it was issued for.
#[derive(Debug)]
pub enum Completion {
    Detection {
        generation: Generation,
        outcome: Result<DetectionResult>,
    },
    Chat {
        generation: Generation,
        outcome: Result<String>,
    },
}

/// The result of folding one [`Completion`] into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Detection(Disposition),
    Chat(Disposition),
}

impl Settled {
    pub const fn is_applied(self) -> bool {
        matches!(
            self,
            Self::Detection(Disposition::Applied) | Self::Chat(Disposition::Applied)
        )
    }
}

/// Drives a [`SessionState`] against a [`PlantService`].
///
/// Requests run on spawned tasks so the session stays interactive while they
/// are in flight. Their responses come back through a channel and are applied
/// by [`next_settled`](Self::next_settled) or
/// [`drain_settled`](Self::drain_settled).
pub struct SessionController<S: PlantService, M: MediaStream = CommandStream> {
    state: SessionState,
    service: Arc<S>,
    camera: Option<CameraSession<M>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: PlantService, M: MediaStream> SessionController<S, M> {
    pub fn new(service: S) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(),
            service: Arc::new(service),
            camera: None,
            completions_tx,
            completions_rx,
        }
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub const fn camera_open(&self) -> bool {
        self.camera.is_some()
    }

    /// Selects a new image. An open camera is released first.
    pub fn set_image_source(&mut self, image: ImageSource) {
        self.cancel_camera();
        debug!(image = %image.display_url(), mime = %image.mime_type(), "image selected");
        self.state.set_image_source(image);
    }

    /// Empties the session and releases the camera.
    pub fn clear_session(&mut self) {
        self.cancel_camera();
        self.state.clear();
        debug!(generation = self.state.generation(), "session cleared");
    }

    /// Starts detection for the current image.
    ///
    /// Returns `Ok(false)` if a detection is already running for it.
    pub fn request_detection(&mut self) -> Result<bool, SessionError> {
        let Some(command) = self.state.request_detection()? else {
            debug!("detection already in flight, not issuing another request");
            return Ok(false);
        };

        debug!(
            generation = command.generation,
            image = %command.image.display_url(),
            "issuing detection request"
        );

        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = service.detect(&command.image).await;
            // The controller may be gone; nobody is left to apply the result then.
            let _ = tx.send(Completion::Detection {
                generation: command.generation,
                outcome,
            });
        });

        Ok(true)
    }

    /// Appends the message to the transcript and asks the chat service.
    pub fn send_chat_message(&mut self, text: &str) -> Result<(), SessionError> {
        let command = self.state.send_chat_message(text)?;

        debug!(
            generation = command.generation,
            plant = %command.plant_name,
            "issuing chat request"
        );

        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = service.chat(&command.plant_name, &command.message).await;
            let _ = tx.send(Completion::Chat {
                generation: command.generation,
                outcome,
            });
        });

        Ok(())
    }

    /// Waits for the next response and applies it.
    ///
    /// Cancel safe: dropping the future before it completes loses nothing.
    pub async fn next_settled(&mut self) -> Option<Settled> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Applies every response that has already arrived.
    pub fn drain_settled(&mut self) -> Vec<Settled> {
        let mut settled = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            settled.push(self.apply(completion));
        }
        settled
    }

    /// Takes ownership of a capture device. A previously open one is released.
    pub fn open_camera(&mut self, stream: M) {
        self.cancel_camera();
        self.camera = Some(CameraSession::acquire(stream));
    }

    /// Captures a frame from the open camera and selects it as the image.
    pub async fn capture_photo(&mut self) -> Result<()> {
        let mut camera = self.camera.take().ok_or(SessionError::NoCamera)?;
        let image = camera.capture().await?;
        self.state.set_image_source(image);
        Ok(())
    }

    pub fn cancel_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.cancel();
        }
    }

    fn apply(&mut self, completion: Completion) -> Settled {
        match completion {
            Completion::Detection {
                generation,
                outcome,
            } => {
                if let Err(err) = &outcome {
                    warn!(generation, error = %format!("{err:#}"), "detection request failed");
                }
                let disposition = self.state.complete_detection(generation, outcome);
                self.log_discard(disposition, generation, "detection");
                Settled::Detection(disposition)
            }
            Completion::Chat {
                generation,
                outcome,
            } => {
                if let Err(err) = &outcome {
                    warn!(generation, error = %format!("{err:#}"), "chat request failed");
                }
                let disposition = self.state.complete_chat(generation, outcome);
                self.log_discard(disposition, generation, "chat");
                Settled::Chat(disposition)
            }
        }
    }

    fn log_discard(&self, disposition: Disposition, generation: Generation, kind: &str) {
        if disposition == Disposition::Discarded {
            debug!(
                generation,
                current = self.state.generation(),
                "discarding stale {kind} response"
            );
        }
    }
}
