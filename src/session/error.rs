use thiserror::Error;

/// Input-validation errors raised by the session before any request is issued.
///
/// None of these are fatal: the session stays interactive and the caller
/// surfaces the message as a hint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The payload is not a recognizable image.
    #[error("'{name}' is not a supported image ({mime_type})")]
    NotAnImage { name: String, mime_type: String },

    /// The payload has no bytes.
    #[error("'{0}' is empty")]
    EmptyImage(String),

    /// Detection was requested without an image.
    #[error("No image selected")]
    NoImage,

    /// Chat was requested before a plant was identified.
    #[error("No plant identified yet, run detection first")]
    NoPlant,

    /// Chat text was empty after trimming.
    #[error("Message is empty")]
    EmptyMessage,

    /// A detection request is still in flight.
    #[error("Detection is still running")]
    DetectionPending,

    /// A chat request is still in flight.
    #[error("Still waiting for the previous answer")]
    ChatPending,

    /// A capture was requested without an open camera.
    #[error("No camera is open")]
    NoCamera,
}
