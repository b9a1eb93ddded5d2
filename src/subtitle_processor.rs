use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::timecode;
use crate::transcript::{Segment, Transcript};

// @module: Subtitle export and import

// @const: SRT timestamp line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2,}:\d{2}:\d{2}[,.]\d{3})").unwrap()
});

// @const: Leading "[Speaker]: " label written by the exporter
static SPEAKER_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]]+)\]:\s*").unwrap()
});

/// Options controlling how segments become subtitle cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Prefix each cue with "[speaker]: " when the segment has a speaker
    pub include_speaker: bool,

    /// Wrap cue text into lines of at most `max_chars`
    pub wrap: bool,

    /// Maximum lines per cue when wrapping; extra lines are dropped
    pub max_lines: usize,

    /// Maximum characters per line when wrapping
    pub max_chars: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_speaker: true,
            wrap: false,
            max_lines: 2,
            max_chars: 42,
        }
    }
}

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    // @field: Sequence number, 1-based
    pub seq_num: usize,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Body lines
    pub lines: Vec<String>,
}

impl SubtitleCue {
    /// Build the cue for one segment
    pub fn from_segment(seq_num: usize, segment: &Segment, options: &ExportOptions) -> Self {
        let text = segment.trimmed_text();
        let text = match (&segment.speaker, options.include_speaker) {
            (Some(speaker), true) => format!("[{}]: {}", speaker, text),
            _ => text.to_string(),
        };

        let lines = if options.wrap {
            let mut lines = wrap_text(&text, options.max_chars);
            // Overflow lines are dropped without reflowing into the kept ones
            lines.truncate(options.max_lines.max(1));
            lines
        } else {
            vec![text]
        };

        SubtitleCue {
            seq_num,
            start: segment.start,
            end: segment.end,
            lines,
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        timecode::encode(self.start)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        timecode::encode(self.end)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.lines.join("\n"))?;
        writeln!(f)
    }
}

/// Greedily pack the words of `text` into lines of at most `max_chars`.
///
/// A word is appended to the current line (with one space) only if the
/// result stays within the limit. The first word of a line is never
/// checked, so a word longer than the limit gets a line of its own.
/// Lengths are counted in characters.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Serialize segments into SRT text.
///
/// Cues are numbered from 1 in segment order. The output depends only on
/// the segments and options.
pub fn export(segments: &[Segment], options: &ExportOptions) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| SubtitleCue::from_segment(i + 1, segment, options).to_string())
        .collect()
}

/// Collection of subtitle cues with metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// File the cues were produced from
    pub source_file: PathBuf,

    /// List of subtitle cues
    pub entries: Vec<SubtitleCue>,
}

impl SubtitleCollection {
    /// Create an empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Build the cues for a transcript
    pub fn from_transcript(source_file: PathBuf, transcript: &Transcript, options: &ExportOptions) -> Self {
        let entries = transcript
            .iter()
            .enumerate()
            .map(|(i, segment)| SubtitleCue::from_segment(i + 1, segment, options))
            .collect();

        SubtitleCollection {
            source_file,
            entries,
        }
    }

    /// Render all cues as SRT text
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        Ok(())
    }

    /// Parse an SRT file into segments
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Vec<Segment>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Self::parse_srt_string(&content)
    }

    /// Parse SRT format string into segments.
    ///
    /// Multi-line cue bodies are joined with a space, and a leading
    /// "[Name]: " label becomes the segment speaker. Malformed entries are
    /// skipped; the result is ordered by start time.
    pub fn parse_srt_string(content: &str) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();

        // State variables for parsing
        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(f64, f64)> = None;
        let mut current_lines: Vec<&str> = Vec::new();

        let mut finish_entry = |seq_num: usize, times: (f64, f64), lines: &[&str]| {
            let text = lines.join(" ");
            match Self::segment_from_cue(times, &text) {
                Some(segment) => segments.push(segment),
                None => warn!("Skipping invalid subtitle entry {}", seq_num),
            }
        };

        for (line_number, line) in content.lines().enumerate() {
            let trimmed = line.trim().trim_start_matches('\u{feff}');

            if trimmed.is_empty() {
                if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
                    if !current_lines.is_empty() {
                        finish_entry(seq_num, times, &current_lines);
                    }
                }
                current_seq_num = None;
                current_times = None;
                current_lines.clear();
                continue;
            }

            if current_seq_num.is_none() {
                match trimmed.parse::<usize>() {
                    Ok(num) => current_seq_num = Some(num),
                    Err(_) => warn!("Unexpected text at line {} before sequence number: {}", line_number + 1, trimmed),
                }
                continue;
            }

            if current_times.is_none() {
                match Self::parse_timestamp_line(trimmed) {
                    Some(times) => current_times = Some(times),
                    None => {
                        warn!("Invalid timestamp line at line {}: {}", line_number + 1, trimmed);
                        current_seq_num = None;
                    }
                }
                continue;
            }

            current_lines.push(trimmed);
        }

        // Add the last entry if there is one
        if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
            if !current_lines.is_empty() {
                finish_entry(seq_num, times, &current_lines);
            }
        }

        if segments.is_empty() {
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        debug!("Parsed {} subtitle entries", segments.len());

        Ok(segments)
    }

    /// Parse a "start --> end" line into seconds
    fn parse_timestamp_line(line: &str) -> Option<(f64, f64)> {
        let caps = TIMESTAMP_REGEX.captures(line)?;
        let start = timecode::decode(caps.get(1)?.as_str()).ok()?;
        let end = timecode::decode(caps.get(2)?.as_str()).ok()?;
        Some((start, end))
    }

    /// Build a segment from a parsed cue, rejecting inverted ranges and empty text
    fn segment_from_cue((start, end): (f64, f64), text: &str) -> Option<Segment> {
        if end < start {
            return None;
        }

        let (speaker, body) = match SPEAKER_PREFIX_REGEX.captures(text) {
            Some(caps) => {
                let label_len = caps.get(0).map_or(0, |m| m.end());
                (caps.get(1).map(|m| m.as_str().trim().to_string()), &text[label_len..])
            }
            None => (None, text),
        };

        let body = body.trim();
        if body.is_empty() {
            return None;
        }

        let mut segment = Segment::new(start, end, body);
        segment.speaker = speaker.filter(|s| !s.is_empty());
        Some(segment)
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
