//! Values owned by a session: the selected image, detection results and the chat transcript.

use bytes::Bytes;
use image::ImageFormat;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::error::SessionError;

/// Placeholder used for text fields the detection service left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// Name given to a plant record the service sent without one.
pub const UNKNOWN_PLANT_NAME: &str = "Unknown";

/// Plant name shown while the chat is not bound to an identified plant.
pub const UNBOUND_PLANT_NAME: &str = "this plant";

/// Seed message for a detection that identified nothing.
pub const NOT_IDENTIFIED_MESSAGE: &str = "I could not identify a plant in this image. \
     Try another photo with the leaves clearly in view.";

/// Assistant reply appended when a chat request fails.
pub const RETRY_NOTICE: &str = "Sorry, I couldn't get an answer right now. Please try again.";

/// Display label of an image read from stdin.
pub const STDIN_LABEL: &str = "stdin";

/// Where an [`ImageSource`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Camera,
}

/// The photo currently selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    kind: SourceKind,
    payload: Bytes,
    mime_type: String,
    display_url: String,
    fingerprint: String,
}

impl ImageSource {
    /// Creates an image source, rejecting empty payloads and non-image MIME types.
    pub fn new(
        kind: SourceKind,
        payload: impl Into<Bytes>,
        mime_type: impl Into<String>,
        display_url: impl Into<String>,
    ) -> Result<Self, SessionError> {
        let payload = payload.into();
        let mime_type = mime_type.into();
        let display_url = display_url.into();

        if !mime_type.starts_with("image/") {
            return Err(SessionError::NotAnImage {
                name: display_url,
                mime_type,
            });
        }
        if payload.is_empty() {
            return Err(SessionError::EmptyImage(display_url));
        }

        let fingerprint = hex::encode(Sha256::digest(&payload));

        Ok(Self {
            kind,
            payload,
            mime_type,
            display_url,
            fingerprint,
        })
    }

    /// Creates an image source from a file's contents, sniffing the MIME type.
    pub fn from_file(path: &Path, payload: impl Into<Bytes>) -> Result<Self, SessionError> {
        let payload = payload.into();
        let display_url = path.display().to_string();
        let mime_type = sniff_mime(&payload, Some(path)).ok_or_else(|| SessionError::NotAnImage {
            name: display_url.clone(),
            mime_type: "unknown format".to_string(),
        })?;

        Self::new(SourceKind::File, payload, mime_type, display_url)
    }

    /// Creates an image source from bytes piped in on stdin.
    pub fn from_stdin(payload: impl Into<Bytes>) -> Result<Self, SessionError> {
        let payload = payload.into();
        let mime_type = sniff_mime(&payload, None).ok_or_else(|| SessionError::NotAnImage {
            name: STDIN_LABEL.to_string(),
            mime_type: "unknown format".to_string(),
        })?;

        Self::new(SourceKind::File, payload, mime_type, STDIN_LABEL)
    }

    /// Creates an image source from a captured camera frame.
    pub fn from_capture(frame: impl Into<Bytes>, label: &str) -> Result<Self, SessionError> {
        let frame = frame.into();
        let mime_type = sniff_mime(&frame, None).ok_or_else(|| SessionError::NotAnImage {
            name: label.to_string(),
            mime_type: "unknown format".to_string(),
        })?;

        Self::new(SourceKind::Camera, frame, mime_type, label)
    }

    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// SHA-256 of the payload, hex encoded.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// File name sent along with the upload.
    pub fn file_name(&self) -> String {
        let extension = self
            .mime_type
            .strip_prefix("image/")
            .unwrap_or("jpeg")
            .to_string();

        match self.kind {
            SourceKind::File => {
                let path = Path::new(&self.display_url);
                match path.file_name() {
                    Some(name) if path.extension().is_some() => name.to_string_lossy().into_owned(),
                    _ => format!("upload.{extension}"),
                }
            }
            SourceKind::Camera => format!("capture.{extension}"),
        }
    }
}

/// Detects an image MIME type from content, falling back to the file extension.
pub fn sniff_mime(payload: &[u8], path: Option<&Path>) -> Option<&'static str> {
    image::guess_format(payload)
        .ok()
        .or_else(|| path.and_then(|p| ImageFormat::from_path(p).ok()))
        .map(|format| format.to_mime_type())
}

/// Metadata for one plant found by the detection service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    #[serde(default = "unknown_name", deserialize_with = "lenient_name")]
    pub name: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub scientific_name: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub common_name: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub local_name: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub family_name: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub genus: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub native_location: String,
    #[serde(default = "not_available", deserialize_with = "lenient_text")]
    pub medicinal_uses: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlantRecord {
    /// Returns `true` if the service identified this plant without error.
    pub const fn is_identified(&self) -> bool {
        self.error.is_none()
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn unknown_name() -> String {
    UNKNOWN_PLANT_NAME.to_string()
}

fn lenient_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name = lenient_text(deserializer)?;
    Ok(if name == NOT_AVAILABLE { unknown_name() } else { name })
}

// The metadata comes from an LLM and is not always a plain string.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_text(value))
}

fn value_text(value: serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => not_available(),
        Value::String(s) if s.trim().is_empty() => not_available(),
        Value::String(s) => s,
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().map(value_text).collect();
            if parts.is_empty() {
                not_available()
            } else {
                parts.join(", ")
            }
        }
        other => other.to_string(),
    }
}

/// The detection service's answer for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// Decoded annotated image (JPEG from the reference backend).
    pub annotated_image: Bytes,
    pub plants: Vec<PlantRecord>,
}

impl DetectionResult {
    /// The first plant identified without error, if any.
    pub fn identified_plant(&self) -> Option<&PlantRecord> {
        self.plants.iter().find(|plant| plant.is_identified())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Conversation about the most recently identified plant.
///
/// The transcript is append-only; a new detection replaces the whole session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    plant_name: Option<String>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Builds the session seeded for a fresh detection result.
    pub fn seeded_from(result: &DetectionResult) -> Self {
        match result.identified_plant() {
            Some(plant) => Self {
                plant_name: Some(plant.name.clone()),
                messages: vec![ChatMessage::assistant(greeting(&plant.name))],
            },
            None => Self {
                plant_name: None,
                messages: vec![ChatMessage::assistant(NOT_IDENTIFIED_MESSAGE)],
            },
        }
    }

    /// The bound plant name, or the placeholder when unbound.
    pub fn plant_name(&self) -> &str {
        self.plant_name.as_deref().unwrap_or(UNBOUND_PLANT_NAME)
    }

    pub fn bound_plant(&self) -> Option<&str> {
        self.plant_name.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }
}

/// Greeting seeded into the transcript once a plant is identified.
pub fn greeting(plant_name: &str) -> String {
    format!(
        "I identified this plant as {plant_name}. Ask me anything about it, \
         such as its medicinal uses or how to grow it."
    )
}
