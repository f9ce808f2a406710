//! Request and response bodies of the recognition backend.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::session::{DetectionResult, PlantRecord};

/// Body of a successful `POST /predict`.
#[derive(Debug, Deserialize)]
pub struct DetectionResponse {
    /// Base64 encoded annotated image.
    pub annotated_image: String,
    #[serde(default)]
    pub plant_data: Vec<PlantRecord>,
}

impl DetectionResponse {
    /// Decodes the annotated image.
    pub fn into_result(self) -> Result<DetectionResult> {
        let encoded = strip_data_url(self.annotated_image.trim());
        let annotated_image = STANDARD
            .decode(encoded)
            .context("Annotated image is not valid base64")?;

        Ok(DetectionResult {
            annotated_image: Bytes::from(annotated_image),
            plants: self.plant_data,
        })
    }
}

// Accepts `data:image/jpeg;base64,...` as well as the bare payload.
fn strip_data_url(encoded: &str) -> &str {
    if encoded.starts_with("data:") {
        encoded
            .split_once(',')
            .map_or(encoded, |(_, payload)| payload)
    } else {
        encoded
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub plant_name: &'a str,
    pub message: &'a str,
}

/// Body returned by `POST /chat`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChatReply {
    Answer { response: String },
    Failure { error: String },
}

impl ChatReply {
    pub fn into_answer(self) -> Result<String> {
        match self {
            Self::Answer { response } => Ok(response),
            Self::Failure { error } => anyhow::bail!("Chat service error: {error}"),
        }
    }
}

/// Body returned by `GET /`.
#[derive(Debug, Deserialize)]
pub struct RootMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Extracts the message from a FastAPI style `{"detail": ...}` error body.
pub fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(message) => Some(message),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
