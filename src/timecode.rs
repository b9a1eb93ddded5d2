/*!
 * SRT timecode conversion.
 *
 * Segment times are carried as floating-point seconds; subtitle files use a
 * fixed `HH:MM:SS,mmm` representation. Hours are never wrapped at 24.
 */

use anyhow::{Result, Context, anyhow};

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Convert seconds to whole milliseconds.
///
/// The value is first rounded to the nearest microsecond so that binary
/// float noise (e.g. `3661.234` stored as `3661.2339999...`) does not lose a
/// millisecond, then truncated to the millisecond. Negative, NaN and
/// infinite inputs map to zero.
pub fn to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }

    let micros = (seconds * MICROS_PER_SECOND).round() as u64;
    micros / 1_000
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_millis(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Encode seconds as an SRT timestamp.
pub fn encode(seconds: f64) -> String {
    format_millis(to_millis(seconds))
}

/// Parse an SRT timestamp (`HH:MM:SS,mmm`, `.` also accepted) into seconds.
pub fn decode(timestamp: &str) -> Result<f64> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 || parts[3].len() != 3 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    let total_ms = hours
        .checked_mul(3_600_000)
        .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
        .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp))?;
    Ok(total_ms as f64 / 1_000.0)
}
