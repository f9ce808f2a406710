mod client;
mod types;

pub use client::PlantApiClient;
pub use types::{ChatReply, ChatRequest, DetectionResponse, RootMessage, error_detail};
