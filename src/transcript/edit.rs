/*!
 * Local edit operations over a transcript.
 *
 * Every operation here is infallible: a request that does not make sense
 * for the current transcript (bad index, degenerate split point, merging
 * the last segment) is ignored and reported as `false`. UI-driven input can
 * arrive twice or out of range and must never break the editor.
 */

use log::debug;

use super::model::{Segment, Transcript};

impl Transcript {
    /// Split the segment at `index` at character offset `cursor_offset`.
    ///
    /// The split time is interpolated from the offset's share of the text
    /// length. Both halves are trimmed and keep the original speaker; word
    /// timings are dropped on both sides. Nothing happens when the offset
    /// is at either end of the text or when a trimmed half would be empty.
    pub fn split(&mut self, index: usize, cursor_offset: usize) -> bool {
        let Some(segment) = self.get(index) else {
            debug!("Ignoring split of segment {}: out of range", index);
            return false;
        };

        let char_count = segment.text.chars().count();
        if cursor_offset == 0 || cursor_offset >= char_count {
            debug!("Ignoring split of segment {} at offset {}: at text boundary", index, cursor_offset);
            return false;
        }

        let byte_offset = match segment.text.char_indices().nth(cursor_offset) {
            Some((byte_offset, _)) => byte_offset,
            None => return false,
        };

        let (left, right) = segment.text.split_at(byte_offset);
        let (left, right) = (left.trim(), right.trim());
        if left.is_empty() || right.is_empty() {
            debug!("Ignoring split of segment {} at offset {}: empty half", index, cursor_offset);
            return false;
        }

        let ratio = cursor_offset as f64 / char_count as f64;
        let split_time = segment.start + (segment.end - segment.start) * ratio;

        let first = Segment {
            start: segment.start,
            end: split_time,
            text: left.to_string(),
            speaker: segment.speaker.clone(),
            words: None,
        };
        let second = Segment {
            start: split_time,
            end: segment.end,
            text: right.to_string(),
            speaker: segment.speaker.clone(),
            words: None,
        };

        debug!("Splitting segment {} at {:.3}s", index, split_time);
        self.replace_range(index..index + 1, vec![first, second])
    }

    /// Merge the segment at `index` with the one after it.
    ///
    /// The result spans from the first start to the second end, joins the
    /// trimmed texts with a single space and keeps the first speaker. The
    /// second speaker and all word timings are discarded.
    pub fn merge_down(&mut self, index: usize) -> bool {
        if index >= self.len().saturating_sub(1) {
            debug!("Ignoring merge of segment {}: no following segment", index);
            return false;
        }

        let (first, second) = (&self.segments()[index], &self.segments()[index + 1]);
        let merged = Segment {
            start: first.start,
            end: second.end.max(first.start),
            text: format!("{} {}", first.text.trim(), second.text.trim()),
            speaker: first.speaker.clone(),
            words: None,
        };

        debug!("Merging segments {} and {}", index, index + 1);
        self.replace_range(index..index + 2, vec![merged])
    }

    /// Replace the text of the segment at `index`.
    ///
    /// Words are left as they are; they may no longer match the text.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.get_mut(index) {
            Some(segment) => {
                segment.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Replace the speaker of the segment at `index`
    pub fn set_speaker(&mut self, index: usize, speaker: impl Into<String>) -> bool {
        match self.get_mut(index) {
            Some(segment) => {
                segment.speaker = Some(speaker.into());
                true
            }
            None => false,
        }
    }
}
