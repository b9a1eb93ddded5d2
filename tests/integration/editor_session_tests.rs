/*!
 * Integration tests for the editor session against a mock service
 */

use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

use subtitler::errors::{EditorError, ServiceError};
use subtitler::service::{MockBehavior, MockCall, MockSubtitleService};
use subtitler::session::{BusyMode, EditorSession};
use subtitler::subtitle_processor::ExportOptions;
use subtitler::transcript::{ActiveCue, Segment, SpeakerChoice, Transcript};
use crate::common::{self, FakePlayer};

#[tokio::test]
async fn test_transcribe_withMedia_shouldReplaceTranscript() {
    let temp_dir = common::create_temp_dir().unwrap();
    let service = common::working_service();
    let mut session = EditorSession::new(service.clone());
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());

    assert_ok!(session.transcribe().await);

    assert_eq!(session.transcript().segments(), common::sample_segments().as_slice());
    assert_eq!(session.busy(), None);
    assert_eq!(session.last_error(), None);
    assert_eq!(service.calls(), vec![MockCall::Transcribe { file_name: "talk.mp3".to_string() }]);
}

#[tokio::test]
async fn test_transcribe_withoutMedia_shouldFailWithoutCallingService() {
    let service = common::working_service();
    let mut session = EditorSession::new(service.clone());

    let result = session.transcribe().await;

    assert!(matches!(result, Err(EditorError::NoMedia)));
    assert_eq!(service.call_count(), 0);
    assert_eq!(session.last_error().as_deref(), Some("No media file loaded"));
}

#[tokio::test]
async fn test_transcribe_shouldClearPendingRenames() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut session = common::sample_session(common::working_service());
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    session.rename_speaker("SPEAKER_00", "Alice");
    assert_eq!(session.speaker_map().len(), 1);

    assert_ok!(session.transcribe().await);

    assert!(session.speaker_map().is_empty());
}

#[tokio::test]
async fn test_remoteFailure_shouldKeepModelAndReportMessage() {
    let temp_dir = common::create_temp_dir().unwrap();
    let service = Arc::new(MockSubtitleService::failing("Invalid file type."));
    let mut session = common::sample_session(service);
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    session.rename_speaker("SPEAKER_01", "Bob");
    let transcript_before = session.transcript().clone();
    let map_before = session.speaker_map().clone();

    let result = session.resync().await;

    assert!(matches!(result, Err(EditorError::Service(ServiceError::ApiError { status_code: 500, .. }))));
    assert_eq!(session.transcript(), &transcript_before);
    assert_eq!(session.speaker_map(), &map_before);
    assert_eq!(session.last_error().as_deref(), Some("Invalid file type."));
    assert_eq!(session.busy(), None);
}

#[tokio::test]
async fn test_successAfterFailure_shouldClearError() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut session = EditorSession::new(common::working_service());

    assert_err!(session.transcribe().await);
    assert!(session.last_error().is_some());

    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    assert_ok!(session.transcribe().await);
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn test_resync_shouldSendEditedTextOnePerLine() {
    let temp_dir = common::create_temp_dir().unwrap();
    let service = common::working_service();
    let mut session = common::sample_session(service.clone());
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    session.set_text(1, "General Kenobi!");

    assert_ok!(session.resync().await);

    assert_eq!(service.calls(), vec![MockCall::Resync {
        file_name: "talk.mp3".to_string(),
        transcript: "Hello there\nGeneral Kenobi!\nYou are a bold one".to_string(),
    }]);
    assert_eq!(session.transcript().len(), 3);
    assert_eq!(session.transcript().get(1).unwrap().text, "General Kenobi!");
    assert_eq!(session.transcript().get(2).unwrap().start, 4.0);
}

#[tokio::test]
async fn test_commitRenames_withEmptyMap_shouldNotCallService() {
    let service = common::working_service();
    let mut session = common::sample_session(service.clone());
    let revision = session.snapshot().revision;

    assert_ok!(session.commit_renames().await);

    assert_eq!(service.call_count(), 0);
    assert_eq!(session.snapshot().revision, revision);
}

#[tokio::test]
async fn test_commitRenames_shouldSendCollapsedMapAndClearIt() {
    let service = common::working_service();
    let mut session = common::sample_session(service.clone());
    session.rename_speaker("SPEAKER_00", "Ben");
    session.rename_speaker("Ben", "Obi-Wan");

    assert_ok!(session.commit_renames().await);

    let calls = service.calls();
    let MockCall::RenameSpeakers { speaker_map, segments } = &calls[0] else {
        panic!("expected a rename call, got {:?}", calls);
    };
    assert_eq!(speaker_map.get("SPEAKER_00").map(String::as_str), Some("Obi-Wan"));
    assert_eq!(speaker_map.get("Ben").map(String::as_str), Some("Obi-Wan"));
    assert_eq!(segments[0].speaker.as_deref(), Some("Obi-Wan"));
    assert!(session.speaker_map().is_empty());
    assert_eq!(session.transcript().get(2).unwrap().speaker.as_deref(), Some("Obi-Wan"));
}

#[tokio::test]
async fn test_refineDiarization_shouldSendCurrentSegments() {
    let temp_dir = common::create_temp_dir().unwrap();
    let service = common::working_service();
    let mut session = common::sample_session(service.clone());
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    session.set_speaker(1, "Grievous");

    assert_ok!(session.refine_diarization().await);

    let calls = service.calls();
    let MockCall::RefineDiarization { segments, .. } = &calls[0] else {
        panic!("expected a refine call, got {:?}", calls);
    };
    assert_eq!(segments[1].speaker.as_deref(), Some("Grievous"));
}

#[tokio::test]
async fn test_busy_shouldBeVisibleWhileCallIsPending() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut session = common::sample_session(common::service_with(MockBehavior::Slow { delay_ms: 200 }));
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    let observer = session.subscribe();

    let (result, seen) = tokio::join!(session.transcribe(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        observer.borrow().busy
    });

    assert_ok!(result);
    assert_eq!(seen, Some(BusyMode::Transcribing));
    assert_eq!(observer.borrow().busy, None);
}

#[tokio::test]
async fn test_droppedCall_shouldLeaveSessionIdleAndUnchanged() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut session = common::sample_session(common::service_with(MockBehavior::Slow { delay_ms: 500 }));
    session.load_media(common::create_test_media(temp_dir.path(), "talk.mp3").unwrap());
    session.set_text(0, "edited");
    let before = session.transcript().clone();

    let timed_out = tokio::time::timeout(Duration::from_millis(20), session.resync()).await;

    assert!(timed_out.is_err());
    assert_eq!(session.busy(), None);
    assert_eq!(session.transcript(), &before);
}

#[tokio::test]
async fn test_snapshots_shouldFollowLocalEdits() {
    let mut session = common::sample_session(common::working_service());
    let mut observer = session.subscribe();
    observer.borrow_and_update();

    assert!(session.split(2, 8));

    assert!(observer.has_changed().unwrap());
    let snapshot = observer.borrow_and_update().clone();
    assert_eq!(snapshot.session_id, session.id());
    assert_eq!(snapshot.revision, 1);
    assert_eq!(snapshot.segments.len(), 4);
    assert_eq!(snapshot.segments[2].text, "You are");
    assert_eq!(snapshot.segments[3].text, "a bold one");
}

#[tokio::test]
async fn test_noOpEdits_shouldNotPublish() {
    let mut session = common::sample_session(common::working_service());
    let mut observer = session.subscribe();
    observer.borrow_and_update();

    assert!(!session.merge_down(2));
    assert!(!session.split(0, 0));
    assert!(!session.set_text(9, "x"));

    assert!(!observer.has_changed().unwrap());
    assert_eq!(session.snapshot().revision, 0);
}

#[test]
fn test_chooseSpeaker_select_shouldAssignName() {
    let mut session = common::sample_session(common::working_service());

    assert!(session.choose_speaker(1, SpeakerChoice::Select("Grievous".to_string())));

    assert_eq!(session.transcript().get(1).unwrap().speaker.as_deref(), Some("Grievous"));
    assert!(session.speaker_map().is_empty());
}

#[test]
fn test_chooseSpeaker_requestRename_shouldRenameEverywhereOnComplete() {
    let mut session = common::sample_session(common::working_service());

    assert!(session.choose_speaker(2, SpeakerChoice::RequestRename));
    assert_eq!(session.pending_rename(), Some("SPEAKER_00"));

    assert_eq!(session.complete_rename("Obi-Wan"), 2);

    assert_eq!(session.pending_rename(), None);
    assert_eq!(session.transcript().get(0).unwrap().speaker.as_deref(), Some("Obi-Wan"));
    assert_eq!(session.speaker_map().get("SPEAKER_00").map(String::as_str), Some("Obi-Wan"));
}

#[test]
fn test_chooseSpeaker_requestRenameThenCancel_shouldChangeNothing() {
    let mut session = common::sample_session(common::working_service());
    let before = session.transcript().clone();

    session.choose_speaker(0, SpeakerChoice::RequestRename);
    session.cancel_rename();

    assert_eq!(session.complete_rename("Nobody"), 0);
    assert_eq!(session.transcript(), &before);
    assert!(session.speaker_map().is_empty());
}

#[test]
fn test_chooseSpeaker_requestRenameWithoutSpeaker_shouldBeIgnored() {
    let transcript = Transcript::from_segments(vec![Segment::new(0.0, 1.0, "anon")]);
    let mut session = EditorSession::with_transcript(common::working_service(), transcript);

    assert!(!session.choose_speaker(0, SpeakerChoice::RequestRename));
    assert_eq!(session.pending_rename(), None);
}

#[test]
fn test_follow_andSeek_shouldDriveHighlight() {
    let mut session = common::sample_session(common::working_service());
    let mut player = FakePlayer::default();

    player.position = 1.0;
    assert_eq!(session.follow(&player), ActiveCue { segment: Some(0), word: Some(1) });

    assert!(session.seek_to_segment(1, &mut player));
    assert_eq!(player.seeks, vec![2.5]);
    assert_eq!(session.active_cue(), ActiveCue { segment: Some(1), word: None });

    assert!(!session.seek_to_segment(9, &mut player));
    assert_eq!(player.seeks.len(), 1);
}

#[test]
fn test_loadTranscript_shouldResetRenamesAndHighlight() {
    let mut session = common::sample_session(common::working_service());
    session.rename_speaker("SPEAKER_00", "Alice");
    session.tick(1.0);

    session.load_transcript(Transcript::from_segments(vec![Segment::new(10.0, 11.0, "new")]));

    assert!(session.speaker_map().is_empty());
    assert_eq!(session.active_cue(), ActiveCue::default());
    assert_eq!(session.tick(5.0).segment, None);
}

#[test]
fn test_export_shouldRenderCurrentTranscript() {
    let mut session = common::sample_session(common::working_service());
    session.merge_down(0);

    let srt = session.export(&ExportOptions::default());

    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:05,000\n[SPEAKER_00]: Hello there General Kenobi\n\n"));
    assert!(srt.contains("\n2\n00:00:05,000 --> 00:00:08,000\n"));
}
