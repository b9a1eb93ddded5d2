use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::app_config::ServiceConfig;
use crate::errors::ServiceError;
use crate::file_utils::MediaFile;
use crate::service::{RenameSpeakersRequest, SegmentsResponse, SubtitleService};
use crate::transcript::Segment;

/// HTTP client for the subtitle-generation service
#[derive(Debug)]
pub struct HttpSubtitleService {
    /// Base URL of the service, without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts on connection failures
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl HttpSubtitleService {
    /// Create a client with default timeout and retry settings
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::new_with_config(endpoint, 600, 3, 1000)
    }

    /// Create a client with explicit settings.
    ///
    /// Transcription of long media can take minutes, so the timeout covers
    /// the whole request including server-side processing.
    pub fn new_with_config(
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        let endpoint = endpoint.into();

        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Create a client from the service section of the configuration
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new_with_config(
            config.endpoint.clone(),
            config.timeout_secs,
            config.max_retries,
            config.retry_backoff_ms,
        )
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Upload part carrying the media bytes
    fn media_part(media: &MediaFile, bytes: &[u8]) -> Result<Part, ServiceError> {
        Part::bytes(bytes.to_vec())
            .file_name(media.file_name.clone())
            .mime_str(&media.mime_type)
            .map_err(|e| ServiceError::InvalidMedia(format!("Invalid MIME type {}: {}", media.mime_type, e)))
    }

    /// Send a request, retrying with exponential backoff when the
    /// connection cannot be established. Responses with an error status are
    /// returned as-is; the service has already done (and failed) the work.
    async fn send_with_retry<F>(&self, operation: &str, build_request: F) -> Result<Response, ServiceError>
    where
        F: Fn() -> Result<RequestBuilder, ServiceError> + Send,
    {
        let mut attempt = 0;

        loop {
            let request = build_request()?;

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt < self.max_retries => {
                    let delay_ms = self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "{} request could not connect (attempt {}/{}), retrying in {}ms: {}",
                        operation, attempt + 1, self.max_retries + 1, delay_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    attempt += 1;
                }
                Err(e) if e.is_connect() => {
                    error!("{} request could not connect: {}", operation, e);
                    return Err(ServiceError::ConnectionError(e.to_string()));
                }
                Err(e) if e.is_timeout() => {
                    error!("{} request timed out: {}", operation, e);
                    return Err(ServiceError::RequestFailed(format!("{} timed out", operation)));
                }
                Err(e) => {
                    error!("{} request failed: {}", operation, e);
                    return Err(ServiceError::RequestFailed(e.to_string()));
                }
            }
        }
    }

    /// Turn a service response into segments or an error carrying the
    /// service's own message when it sent one
    async fn parse_segments(operation: &str, response: Response) -> Result<Vec<Segment>, ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to read {} response: {}", operation, e)))?;

        if !status.is_success() {
            let message = extract_error_detail(&body)
                .unwrap_or_else(|| format!("{} failed (HTTP {})", operation, status.as_u16()));
            error!("{} failed ({}): {}", operation, status, message);
            return Err(ServiceError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: SegmentsResponse = serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse {} response: {}. Raw response (first 500 chars): {}",
                operation,
                e,
                body.chars().take(500).collect::<String>()
            );
            ServiceError::ParseError(e.to_string())
        })?;

        info!("{} returned {} segment(s)", operation, parsed.segments.len());
        Ok(parsed.segments)
    }
}

/// Pull the human-readable `detail` out of an error response body.
///
/// String details are returned as they are; structured details (such as
/// validation error lists) are rendered as JSON. Empty or missing details
/// give `None`.
pub fn extract_error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl SubtitleService for HttpSubtitleService {
    async fn transcribe(&self, media: &MediaFile) -> Result<Vec<Segment>, ServiceError> {
        let bytes = media.read_bytes().await?;
        let url = self.url("transcribe");
        debug!("Uploading {} ({} bytes) for transcription", media.file_name, bytes.len());

        let response = self
            .send_with_retry("Transcription", || {
                let form = Form::new().part("file", Self::media_part(media, &bytes)?);
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;

        Self::parse_segments("Transcription", response).await
    }

    async fn resync(&self, media: &MediaFile, transcript: &str) -> Result<Vec<Segment>, ServiceError> {
        let bytes = media.read_bytes().await?;
        let url = self.url("resync");
        debug!("Uploading {} with {} transcript line(s) for resync", media.file_name, transcript.lines().count());

        let response = self
            .send_with_retry("Resync", || {
                let form = Form::new()
                    .part("file", Self::media_part(media, &bytes)?)
                    .text("transcript", transcript.to_string());
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;

        Self::parse_segments("Resync", response).await
    }

    async fn rename_speakers(
        &self,
        segments: &[Segment],
        speaker_map: &BTreeMap<String, String>,
    ) -> Result<Vec<Segment>, ServiceError> {
        let url = self.url("rename_speakers");
        let body = RenameSpeakersRequest { segments, speaker_map };
        debug!("Sending {} speaker rename(s)", speaker_map.len());

        let response = self
            .send_with_retry("Speaker rename", || Ok(self.client.post(&url).json(&body)))
            .await?;

        Self::parse_segments("Speaker rename", response).await
    }

    async fn refine_diarization(&self, media: &MediaFile, segments: &[Segment]) -> Result<Vec<Segment>, ServiceError> {
        let bytes = media.read_bytes().await?;
        let url = self.url("refine_diarization");
        let segments_json = serde_json::to_string(segments)
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to encode segments: {}", e)))?;

        let response = self
            .send_with_retry("Diarization refinement", || {
                let form = Form::new()
                    .part("file", Self::media_part(media, &bytes)?)
                    .text("segments_json", segments_json.clone());
                Ok(self.client.post(&url).multipart(form))
            })
            .await?;

        Self::parse_segments("Diarization refinement", response).await
    }

    async fn test_connection(&self) -> Result<(), ServiceError> {
        let url = format!("{}/", self.base_url);
        let response = self
            .send_with_retry("Connection test", || Ok(self.client.get(&url)))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::ApiError {
                status_code: status.as_u16(),
                message: format!("Connection test failed (HTTP {})", status.as_u16()),
            });
        }

        Ok(())
    }
}
