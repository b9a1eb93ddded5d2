/*!
 * Core transcript model types.
 *
 * A transcript is an ordered sequence of time-aligned segments as produced
 * by the subtitle-generation service. The sequence is JSON-serializable in
 * the same shape the service returns, so service responses and transcript
 * files deserialize into the same types.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

use log::warn;

/// One token of a segment with optional sub-segment timing.
///
/// Words come from the service and are never edited locally. They are a
/// highlighting aid only; `Segment::text` is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Token text
    #[serde(alias = "word")]
    pub text: String,

    /// Start time in seconds, absent for tokens the aligner could not place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    /// End time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,

    /// Speaker attributed to this token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl Word {
    /// Create a timed word
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start: Some(start),
            end: Some(end),
            speaker: None,
        }
    }

    /// Create a word the aligner could not place in time
    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: None,
            end: None,
            speaker: None,
        }
    }
}

/// A single timed transcript cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds, never before `start`
    pub end: f64,

    /// Segment text
    pub text: String,

    /// Speaker display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Word-level decomposition of `text`, possibly stale after edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
}

impl Segment {
    /// Create a segment. An `end` before `start` is clamped to `start`.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end: end.max(start),
            text: text.into(),
            speaker: None,
            words: None,
        }
    }

    /// Set the speaker
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Set the word decomposition
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = Some(words);
        self
    }

    /// Segment duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` lies within `[start, end]`, both bounds inclusive
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Text with surrounding whitespace removed
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Summary figures for a transcript.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptStats {
    /// Number of segments
    pub segment_count: usize,
    /// Seconds from the first start to the last end
    pub total_duration: f64,
    /// Whitespace-separated words across all segment texts
    pub word_count: usize,
    /// Distinct speakers in first-appearance order
    pub speakers: Vec<String>,
}

/// Ordered sequence of segments held by an editing session.
///
/// The order is by `start`, non-decreasing. Structural changes go through
/// [`Transcript::replace_range`], which swaps a contiguous range for its
/// replacement in one step so no intermediate state is observable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    segments: Vec<Segment>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from a segment list as returned by the service.
    ///
    /// Segments whose `end` precedes `start` get `end` clamped to `start`.
    /// The order is kept as received.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut segments = segments;
        for (index, segment) in segments.iter_mut().enumerate() {
            if segment.end < segment.start {
                warn!(
                    "Segment {} ends before it starts ({} < {}), clamping end",
                    index, segment.end, segment.start
                );
                segment.end = segment.start;
            }
        }

        Self { segments }
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether there are no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment at `index`
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Segment> {
        self.segments.get_mut(index)
    }

    /// All segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterate over segments in order
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Consume the transcript, returning its segments
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// Replace the segments in `range` with `replacement`.
    ///
    /// Returns `false` and leaves the transcript untouched when the range is
    /// inverted or extends past the end.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: Vec<Segment>) -> bool {
        if range.start > range.end || range.end > self.segments.len() {
            return false;
        }

        self.segments.splice(range, replacement);
        true
    }

    /// Replace the whole sequence, as done when a service call returns
    pub fn replace_all(&mut self, segments: Vec<Segment>) {
        *self = Self::from_segments(segments);
    }

    /// Segment texts joined with newlines, one line per segment.
    ///
    /// This is the transcript body sent for re-alignment, so local text
    /// edits survive a resync.
    pub fn joined_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Distinct speaker names in first-appearance order
    pub fn speakers(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .filter_map(|s| s.speaker.as_deref())
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect()
    }

    /// Compute summary figures
    pub fn stats(&self) -> TranscriptStats {
        let total_duration = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (last.end - first.start).max(0.0),
            _ => 0.0,
        };

        TranscriptStats {
            segment_count: self.segments.len(),
            total_duration,
            word_count: self.segments.iter().map(|s| s.text.split_whitespace().count()).sum(),
            speakers: self.speakers(),
        }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl From<Vec<Segment>> for Transcript {
    fn from(segments: Vec<Segment>) -> Self {
        Self::from_segments(segments)
    }
}
