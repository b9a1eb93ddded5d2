/*!
 * Media playback collaborator.
 *
 * Decoding and rendering happen elsewhere; the editor only reads the
 * playback clock and asks for seeks.
 */

/// A media player the editor can follow and steer
pub trait MediaPlayer {
    /// Current playback position in seconds, monotonic while playing
    fn current_time(&self) -> f64;

    /// Move playback to `seconds`
    fn seek(&mut self, seconds: f64);

    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback
    fn pause(&mut self);
}
