/*!
 * Client side of the subtitle-generation service.
 *
 * The service does all speech work (transcription, forced alignment,
 * diarization). This crate only sees it through the four operations of
 * [`SubtitleService`], each of which returns a fresh segment list:
 * - `http`: reqwest client for the HTTP service
 * - `mock`: in-process stand-in for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::errors::ServiceError;
use crate::file_utils::MediaFile;
use crate::transcript::Segment;

/// Operations offered by the subtitle-generation service
///
/// Implementations must not touch any local editor state; callers replace
/// their transcript with the returned segments on success.
#[async_trait]
pub trait SubtitleService: Send + Sync + Debug {
    /// Transcribe, align and diarize a media file from scratch
    async fn transcribe(&self, media: &MediaFile) -> Result<Vec<Segment>, ServiceError>;

    /// Re-time an edited transcript (one segment per line) against the media
    async fn resync(&self, media: &MediaFile, transcript: &str) -> Result<Vec<Segment>, ServiceError>;

    /// Apply a speaker rename map and return the canonical segments
    async fn rename_speakers(
        &self,
        segments: &[Segment],
        speaker_map: &BTreeMap<String, String>,
    ) -> Result<Vec<Segment>, ServiceError>;

    /// Re-run speaker attribution, guided by the speakers already assigned
    async fn refine_diarization(&self, media: &MediaFile, segments: &[Segment]) -> Result<Vec<Segment>, ServiceError>;

    /// Check the service is reachable
    async fn test_connection(&self) -> Result<(), ServiceError>;
}

/// Response body shared by all segment-returning endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsResponse {
    /// SRT rendering produced by the service, unused by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srt_content: Option<String>,

    /// The segments
    pub segments: Vec<Segment>,
}

/// Request body for the rename endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RenameSpeakersRequest<'a> {
    /// Current segments
    pub segments: &'a [Segment],
    /// Old name to new name
    pub speaker_map: &'a BTreeMap<String, String>,
}

pub mod http;
pub mod mock;

pub use http::HttpSubtitleService;
pub use mock::{MockBehavior, MockCall, MockSubtitleService};
