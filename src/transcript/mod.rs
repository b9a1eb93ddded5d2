/*!
 * Transcript editing engine.
 *
 * - `model`: segments, words and the ordered transcript sequence
 * - `edit`: split, merge and field edits
 * - `speakers`: speaker renaming with chain collapsing
 * - `locator`: playback time to active segment and word
 */

pub mod edit;
pub mod locator;
pub mod model;
pub mod speakers;

pub use locator::{ActiveCue, PlaybackLocator};
pub use model::{Segment, Transcript, TranscriptStats, Word};
pub use speakers::{SpeakerChoice, SpeakerRegistry};
