/*!
 * Mock subtitle service for testing.
 *
 * Mirrors what the real service does closely enough for editor tests:
 * - transcribe returns a preset segment list
 * - resync lays the transcript lines out back to back, two seconds each
 * - rename applies the map once to each segment's speaker
 * - refine returns the segments with their text and timing unchanged
 *
 * Every call is recorded so tests can assert on what was sent.
 */

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::ServiceError;
use crate::file_utils::MediaFile;
use crate::service::SubtitleService;
use crate::transcript::Segment;

/// Seconds given to each resynced line
const RESYNC_LINE_SECONDS: f64 = 2.0;

/// Behavior mode for the mock service
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Every call succeeds
    Working,
    /// Every call fails with the given status and detail message
    Failing { status_code: u16, message: String },
    /// Every call fails to connect
    Unreachable,
    /// Calls succeed after a delay
    Slow { delay_ms: u64 },
}

/// A recorded call to the mock service
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Transcribe { file_name: String },
    Resync { file_name: String, transcript: String },
    RenameSpeakers { segments: Vec<Segment>, speaker_map: BTreeMap<String, String> },
    RefineDiarization { file_name: String, segments: Vec<Segment> },
    TestConnection,
}

/// In-process subtitle service
#[derive(Debug)]
pub struct MockSubtitleService {
    behavior: MockBehavior,
    transcription: Vec<Segment>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockSubtitleService {
    /// Create a mock with the given behavior and no preset transcription
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            transcription: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// A mock that always fails with an HTTP 500 and `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockBehavior::Failing {
            status_code: 500,
            message: message.into(),
        })
    }

    /// Segments returned by `transcribe`
    pub fn with_transcription(mut self, segments: Vec<Segment>) -> Self {
        self.transcription = segments;
        self
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    async fn record(&self, call: MockCall) -> Result<(), ServiceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        match &self.behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing { status_code, message } => Err(ServiceError::ApiError {
                status_code: *status_code,
                message: message.clone(),
            }),
            MockBehavior::Unreachable => Err(ServiceError::ConnectionError("Connection refused".to_string())),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                Ok(())
            }
        }
    }
}

impl Default for MockSubtitleService {
    fn default() -> Self {
        Self::working()
    }
}

#[async_trait]
impl SubtitleService for MockSubtitleService {
    async fn transcribe(&self, media: &MediaFile) -> Result<Vec<Segment>, ServiceError> {
        self.record(MockCall::Transcribe {
            file_name: media.file_name.clone(),
        })
        .await?;

        Ok(self.transcription.clone())
    }

    async fn resync(&self, media: &MediaFile, transcript: &str) -> Result<Vec<Segment>, ServiceError> {
        self.record(MockCall::Resync {
            file_name: media.file_name.clone(),
            transcript: transcript.to_string(),
        })
        .await?;

        Ok(transcript
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                let start = i as f64 * RESYNC_LINE_SECONDS;
                Segment::new(start, start + RESYNC_LINE_SECONDS, line.trim())
            })
            .collect())
    }

    async fn rename_speakers(
        &self,
        segments: &[Segment],
        speaker_map: &BTreeMap<String, String>,
    ) -> Result<Vec<Segment>, ServiceError> {
        self.record(MockCall::RenameSpeakers {
            segments: segments.to_vec(),
            speaker_map: speaker_map.clone(),
        })
        .await?;

        Ok(segments
            .iter()
            .cloned()
            .map(|mut segment| {
                let renamed = segment
                    .speaker
                    .as_ref()
                    .and_then(|speaker| speaker_map.get(speaker))
                    .filter(|name| !name.is_empty())
                    .cloned();
                if let Some(name) = renamed {
                    segment.speaker = Some(name);
                }
                segment.words = None;
                segment
            })
            .collect())
    }

    async fn refine_diarization(&self, media: &MediaFile, segments: &[Segment]) -> Result<Vec<Segment>, ServiceError> {
        self.record(MockCall::RefineDiarization {
            file_name: media.file_name.clone(),
            segments: segments.to_vec(),
        })
        .await?;

        Ok(segments.to_vec())
    }

    async fn test_connection(&self) -> Result<(), ServiceError> {
        self.record(MockCall::TestConnection).await
    }
}
