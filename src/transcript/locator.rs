/*!
 * Playback position to transcript position mapping.
 */

use super::model::Segment;

/// Segment and word to highlight for the current playback time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveCue {
    /// Index of the active segment
    pub segment: Option<usize>,
    /// Index of the active word within the active segment
    pub word: Option<usize>,
}

/// Tracks the active segment across playback ticks.
///
/// When the time falls between segments the previous segment stays
/// active, so the highlight does not flicker off in gaps between cues.
#[derive(Debug, Clone, Default)]
pub struct PlaybackLocator {
    active_segment: Option<usize>,
}

impl PlaybackLocator {
    /// Create a locator with nothing active
    pub fn new() -> Self {
        Self::default()
    }

    /// The segment that was active after the last update
    pub fn active_segment(&self) -> Option<usize> {
        self.active_segment
    }

    /// Forget the active segment, e.g. after the transcript was replaced
    pub fn reset(&mut self) {
        self.active_segment = None;
    }

    /// Resolve playback time `t` against `segments`.
    pub fn locate(&mut self, segments: &[Segment], t: f64) -> ActiveCue {
        match find_segment(segments, t) {
            Some(index) => self.active_segment = Some(index),
            None => {
                // sticky index must still point into the sequence
                if self.active_segment.is_some_and(|index| index >= segments.len()) {
                    self.active_segment = None;
                }
            }
        }

        let word = self
            .active_segment
            .and_then(|index| segments.get(index))
            .and_then(|segment| find_word(segment, t));

        ActiveCue {
            segment: self.active_segment,
            word,
        }
    }
}

/// First segment containing `t`, bounds inclusive.
pub fn find_segment(segments: &[Segment], t: f64) -> Option<usize> {
    segments.iter().position(|segment| segment.contains(t))
}

/// Last word of `segment` that has started by `t`.
///
/// Words without a start time never become active.
pub fn find_word(segment: &Segment, t: f64) -> Option<usize> {
    segment
        .words
        .as_ref()?
        .iter()
        .rposition(|word| word.start.is_some_and(|start| start <= t))
}
