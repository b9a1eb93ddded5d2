/*!
 * Speaker renaming for transcript editing.
 *
 * Renames are applied to the local transcript immediately and also kept
 * in a pending map so they can be confirmed by the service later. The map
 * is kept collapsed: no value is ever also a key, so a single lookup gives
 * the final name and the service can apply it without chasing chains.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use log::debug;

use super::model::Transcript;

/// What the user picked in a segment's speaker selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerChoice {
    /// Assign an existing or new speaker name to the segment
    Select(String),
    /// Start renaming the segment's current speaker everywhere
    RequestRename,
}

/// Pending speaker renames, old display name to new display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerRegistry {
    renames: BTreeMap<String, String>,
}

impl SpeakerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename `old_name` to `new_name` in the map and in the transcript.
    ///
    /// Existing entries that pointed at `old_name` are redirected to
    /// `new_name`, so `A -> B` followed by `B -> C` leaves `A -> C` and
    /// `B -> C`. An entry keyed by `new_name` is dropped: that name is live
    /// again and the segments it used to label were already relabelled.
    ///
    /// Returns the number of segments relabelled. Empty or unchanged names
    /// are ignored.
    pub fn rename(&mut self, transcript: &mut Transcript, old_name: &str, new_name: &str) -> usize {
        let new_name = new_name.trim();
        if new_name.is_empty() || old_name == new_name {
            debug!("Ignoring rename of '{}' to '{}'", old_name, new_name);
            return 0;
        }

        self.renames.remove(new_name);
        self.renames.insert(old_name.to_string(), new_name.to_string());
        for target in self.renames.values_mut() {
            if target.as_str() == old_name {
                *target = new_name.to_string();
            }
        }

        let mut relabelled = 0;
        for index in 0..transcript.len() {
            let matches = transcript
                .get(index)
                .is_some_and(|s| s.speaker.as_deref() == Some(old_name));
            if matches && transcript.set_speaker(index, new_name) {
                relabelled += 1;
            }
        }

        debug!("Renamed speaker '{}' to '{}' on {} segment(s)", old_name, new_name, relabelled);
        relabelled
    }

    /// Final name for `name`, or `name` itself when it was never renamed
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    /// The pending rename map
    pub fn map(&self) -> &BTreeMap<String, String> {
        &self.renames
    }

    /// Whether there are no pending renames
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }

    /// Number of pending renames
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Forget all pending renames
    pub fn clear(&mut self) {
        self.renames.clear();
    }
}
