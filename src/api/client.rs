use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

use super::types::{ChatReply, ChatRequest, DetectionResponse, RootMessage, error_detail};
use crate::config::ResolvedConfig;
use crate::session::{DetectionResult, ImageSource, PlantService};

/// HTTP client for the plant recognition backend.
#[derive(Clone)]
pub struct PlantApiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl PlantApiClient {
    /// Creates a client. `timeout` bounds each whole request when set.
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        // Add Authorization header if API key is present
        match &self.api_key {
            Some(api_key) => request.header("Authorization", format!("Bearer {api_key}")),
            None => request,
        }
    }

    /// Uploads an image to `POST /predict`.
    pub async fn predict(&self, image: &ImageSource) -> Result<DetectionResult> {
        let url = self.url("predict");

        let part = Part::bytes(image.payload().to_vec())
            .file_name(image.file_name())
            .mime_str(image.mime_type())
            .with_context(|| format!("Invalid MIME type: {}", image.mime_type()))?;
        let form = Form::new().part("file", part);

        debug!(%url, bytes = image.payload().len(), "uploading image for detection");

        let response = self
            .authorize(self.client.post(&url).multipart(form))
            .send()
            .await
            .with_context(|| format!("Failed to connect to detection service: {url}"))?;

        let response = check_status(response, &url).await?;
        let body: DetectionResponse = response
            .json()
            .await
            .context("Failed to parse detection response")?;

        body.into_result()
    }

    /// Sends a follow-up question to `POST /chat`.
    pub async fn ask(&self, plant_name: &str, message: &str) -> Result<String> {
        let url = self.url("chat");
        let request = ChatRequest {
            plant_name,
            message,
        };

        debug!(%url, plant = plant_name, "sending chat message");

        let response = self
            .authorize(self.client.post(&url).json(&request))
            .send()
            .await
            .with_context(|| format!("Failed to connect to chat service: {url}"))?;

        let response = check_status(response, &url).await?;
        let reply: ChatReply = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        reply.into_answer()
    }

    /// Reads the welcome message from `GET /`.
    pub async fn ping(&self) -> Result<String> {
        let url = self.url("");

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("Failed to connect to API endpoint: {url}"))?;

        let response = check_status(response, &url).await?;
        let root: RootMessage = response
            .json()
            .await
            .context("Failed to parse service greeting")?;

        Ok(root.message)
    }
}

async fn check_status(response: Response, url: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or(body);
    anyhow::bail!("API request to {url} failed with status {status}: {detail}")
}

impl PlantService for PlantApiClient {
    async fn detect(&self, image: &ImageSource) -> Result<DetectionResult> {
        self.predict(image).await
    }

    async fn chat(&self, plant_name: &str, message: &str) -> Result<String> {
        self.ask(plant_name, message).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> PlantApiClient {
        PlantApiClient::new(endpoint.to_string(), None, None).unwrap()
    }

    #[test]
    fn test_url_joins_paths() {
        let api = client("http://localhost:8000");
        assert_eq!(api.url("predict"), "http://localhost:8000/predict");
        assert_eq!(api.url("/chat"), "http://localhost:8000/chat");
        assert_eq!(api.url(""), "http://localhost:8000/");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let api = client("https://plants.example.com/api/");
        assert_eq!(api.url("predict"), "https://plants.example.com/api/predict");
    }

    #[test]
    fn test_from_config_keeps_endpoint() {
        let config = ResolvedConfig {
            server_name: Some("local".to_string()),
            endpoint: "http://127.0.0.1:9000".to_string(),
            api_key: Some("secret".to_string()),
            timeout: Some(Duration::from_secs(5)),
            camera_command: vec![],
        };
        let api = PlantApiClient::from_config(&config).unwrap();
        assert_eq!(api.endpoint(), "http://127.0.0.1:9000");
    }

    #[tokio::test]
    async fn test_unreachable_service_reports_endpoint() {
        let api = client("http://127.0.0.1:9");
        let err = api.ask("Neem", "hello").await.unwrap_err();
        assert!(err.to_string().contains("http://127.0.0.1:9/chat"));
    }
}
