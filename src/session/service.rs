use anyhow::Result;
use std::future::Future;

use super::model::{DetectionResult, ImageSource};

/// The two external services a session talks to.
///
/// Implementations must not retry on their own; failures are reported back
/// to the session as-is.
pub trait PlantService: Send + Sync + 'static {
    /// Runs plant detection on one image.
    fn detect(&self, image: &ImageSource) -> impl Future<Output = Result<DetectionResult>> + Send;

    /// Asks a follow-up question about a plant and returns the answer text.
    fn chat(&self, plant_name: &str, message: &str) -> impl Future<Output = Result<String>> + Send;
}
