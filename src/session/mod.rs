/*!
 * Transcript editing sessions.
 *
 * This module provides:
 * - The editor session that owns a transcript and drives remote operations
 * - Snapshots published to observers after every change
 * - The media player seam used for highlight and seek
 */

pub mod editor;
pub mod models;
pub mod player;

pub use editor::EditorSession;
pub use models::{BusyMode, SessionSnapshot};
pub use player::MediaPlayer;
