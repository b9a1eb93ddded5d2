/*!
 * Tests for SRT export and import
 */

use anyhow::Result;
use std::path::PathBuf;

use subtitler::subtitle_processor::{self, ExportOptions, SubtitleCollection, SubtitleCue, wrap_text};
use subtitler::transcript::{Segment, Transcript};
use crate::common;

fn no_speakers() -> ExportOptions {
    ExportOptions {
        include_speaker: false,
        ..ExportOptions::default()
    }
}

#[test]
fn test_export_withSingleSegment_shouldMatchSrtLayout() {
    let output = subtitle_processor::export(&[Segment::new(0.0, 1.5, "hello world")], &ExportOptions::default());
    assert_eq!(output, "1\n00:00:00,000 --> 00:00:01,500\nhello world\n\n");
}

#[test]
fn test_export_withSpeaker_shouldPrefixLabel() {
    let segments = [Segment::new(0.0, 1.0, "  Hi ").with_speaker("Alice")];

    let with_label = subtitle_processor::export(&segments, &ExportOptions::default());
    let without_label = subtitle_processor::export(&segments, &no_speakers());

    assert_eq!(with_label, "1\n00:00:00,000 --> 00:00:01,000\n[Alice]: Hi\n\n");
    assert_eq!(without_label, "1\n00:00:00,000 --> 00:00:01,000\nHi\n\n");
}

#[test]
fn test_export_shouldNumberFromOneOnEveryCall() {
    let segments = common::sample_segments();
    let options = no_speakers();

    let first = subtitle_processor::export(&segments, &options);
    let second = subtitle_processor::export(&segments, &options);

    assert_eq!(first, second);
    assert!(first.starts_with("1\n"));
    assert!(first.contains("\n\n3\n00:00:05,000 --> 00:00:08,000\nYou are a bold one\n\n"));
}

#[test]
fn test_export_withNoSegments_shouldBeEmpty() {
    assert_eq!(subtitle_processor::export(&[], &ExportOptions::default()), "");
}

#[test]
fn test_wrapText_shouldPackGreedily() {
    assert_eq!(wrap_text("a bb ccc dddd", 5), vec!["a bb", "ccc", "dddd"]);
    assert_eq!(wrap_text("  spaced   out  ", 20), vec!["spaced out"]);
    assert!(wrap_text("   ", 5).is_empty());
}

#[test]
fn test_wrapText_withOverlongWord_shouldGiveItOwnLine() {
    assert_eq!(wrap_text("supercalifragilistic is long", 5), vec!["supercalifragilistic", "is", "long"]);
}

#[test]
fn test_wrapText_shouldCountCharactersNotBytes() {
    assert_eq!(wrap_text("ééé ééé", 7), vec!["ééé ééé"]);
}

#[test]
fn test_cue_withWrapAndMaxLines_shouldTruncateSilently() {
    let options = ExportOptions {
        include_speaker: false,
        wrap: true,
        max_lines: 2,
        max_chars: 5,
    };

    let cue = SubtitleCue::from_segment(1, &Segment::new(0.0, 1.0, "a bb ccc dddd"), &options);

    assert_eq!(cue.lines, vec!["a bb", "ccc"]);
    assert_eq!(cue.to_string(), "1\n00:00:00,000 --> 00:00:01,000\na bb\nccc\n\n");
}

#[test]
fn test_cue_withWrap_shouldCountSpeakerLabel() {
    let options = ExportOptions {
        include_speaker: true,
        wrap: true,
        max_lines: 3,
        max_chars: 12,
    };

    let cue = SubtitleCue::from_segment(4, &Segment::new(0.0, 1.0, "hello there").with_speaker("Bo"), &options);

    assert_eq!(cue.lines, vec!["[Bo]: hello", "there"]);
    assert_eq!(cue.format_start_time(), "00:00:00,000");
}

#[test]
fn test_parseSrtString_withSpeakersAndMultilineCue_shouldBuildSegments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "test.srt")?;

    let segments = SubtitleCollection::parse_srt_file(&path)?;

    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].speaker.as_deref(), Some("Alice"));
    assert_eq!(segments[0].text, "This is a test subtitle.");
    assert_eq!(segments[0].start, 1.0);
    assert_eq!(segments[0].end, 4.0);
    assert_eq!(segments[1].speaker, None);
    assert_eq!(segments[1].text, "It contains multiple lines.");
    assert_eq!(segments[2].speaker.as_deref(), Some("Bob"));
    Ok(())
}

#[test]
fn test_parseSrtString_withInvalidEntries_shouldSkipThem() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nGood\n\n2\nnot a timestamp\nBad\n\n3\n00:00:05,000 --> 00:00:04,000\nBackwards\n\n4\n00:00:06,000 --> 00:00:07,500\nAlso good\n";

    let segments = SubtitleCollection::parse_srt_string(content)?;

    let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Good", "Also good"]);
    assert_eq!(segments[1].end, 7.5);
    Ok(())
}

#[test]
fn test_parseSrtString_withOutOfOrderCues_shouldSortByStart() -> Result<()> {
    let content = "2\n00:00:05,000 --> 00:00:06,000\nSecond\n\n1\n00:00:01,000 --> 00:00:02,000\nFirst\n";

    let segments = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(segments[0].text, "First");
    assert_eq!(segments[1].text, "Second");
    Ok(())
}

#[test]
fn test_parseSrtString_withNoValidEntry_shouldFail() {
    assert!(SubtitleCollection::parse_srt_string("").is_err());
    assert!(SubtitleCollection::parse_srt_string("hello\nworld\n").is_err());
}

#[test]
fn test_exportThenParse_shouldKeepTextTimingAndSpeakers() -> Result<()> {
    let transcript = common::sample_transcript();

    let srt = subtitle_processor::export(transcript.segments(), &ExportOptions::default());
    let parsed = SubtitleCollection::parse_srt_string(&srt)?;

    assert_eq!(parsed.len(), 3);
    for (original, parsed) in transcript.iter().zip(&parsed) {
        assert_eq!(original.text, parsed.text);
        assert_eq!(original.speaker, parsed.speaker);
        assert_eq!(original.start, parsed.start);
        assert_eq!(original.end, parsed.end);
    }
    Ok(())
}

#[test]
fn test_writeToSrt_shouldWriteSameTextAsExport() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = Transcript::from_segments(common::sample_segments());
    let options = ExportOptions::default();
    let output = temp_dir.path().join("nested").join("out.srt");

    let collection = SubtitleCollection::from_transcript(PathBuf::from("talk.json"), &transcript, &options);
    collection.write_to_srt(&output)?;

    assert_eq!(std::fs::read_to_string(&output)?, subtitle_processor::export(transcript.segments(), &options));
    assert_eq!(collection.entries.len(), 3);
    Ok(())
}

#[test]
fn test_parseSrtString_withHugeHourField_shouldSkipEntry() -> Result<()> {
    let content = "1\n99999999999999999:00:00,000 --> 99999999999999999:00:01,000\nhi\n\n\
                   2\n00:00:01,000 --> 00:00:02,000\nok\n\n";

    let segments = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "ok");
    assert_eq!(segments[0].start, 1.0);
    Ok(())
}
