use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::{EditorError, ServiceError};
use crate::file_utils::MediaFile;
use crate::service::SubtitleService;
use crate::session::models::{BusyMode, SessionSnapshot};
use crate::session::player::MediaPlayer;
use crate::subtitle_processor::{self, ExportOptions};
use crate::transcript::{ActiveCue, PlaybackLocator, Segment, SpeakerChoice, SpeakerRegistry, Transcript};

/// One transcript editing session.
///
/// Owns the transcript, the pending speaker renames and the playback
/// highlight state. Local edits are synchronous and never fail; remote
/// operations go through the [`SubtitleService`] one at a time and replace
/// the transcript wholesale when they succeed. After every change a new
/// [`SessionSnapshot`] is published to subscribers.
pub struct EditorSession {
    id: Uuid,
    transcript: Transcript,
    speakers: SpeakerRegistry,
    locator: PlaybackLocator,
    active: ActiveCue,
    media: Option<MediaFile>,
    pending_rename: Option<String>,
    service: Arc<dyn SubtitleService>,
    snapshots: watch::Sender<SessionSnapshot>,
}

/// Marks the session busy for the lifetime of a remote call.
///
/// Dropping the guard, including when the call's future is dropped before
/// completion, puts the session back to idle.
struct BusyGuard<'a> {
    snapshots: &'a watch::Sender<SessionSnapshot>,
}

impl<'a> BusyGuard<'a> {
    fn enter(snapshots: &'a watch::Sender<SessionSnapshot>, mode: BusyMode) -> Self {
        snapshots.send_modify(|snapshot| {
            snapshot.busy = Some(mode);
            snapshot.last_error = None;
        });
        Self { snapshots }
    }

    fn fail(&self, message: String) {
        self.snapshots.send_modify(|snapshot| snapshot.last_error = Some(message));
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.snapshots.send_modify(|snapshot| snapshot.busy = None);
    }
}

impl EditorSession {
    /// Create an empty session using `service` for remote operations
    pub fn new(service: Arc<dyn SubtitleService>) -> Self {
        Self::with_transcript(service, Transcript::new())
    }

    /// Create a session editing an existing transcript
    pub fn with_transcript(service: Arc<dyn SubtitleService>, transcript: Transcript) -> Self {
        let id = Uuid::new_v4();
        let (snapshots, _) = watch::channel(SessionSnapshot::initial(id, transcript.segments()));

        Self {
            id,
            transcript,
            speakers: SpeakerRegistry::new(),
            locator: PlaybackLocator::new(),
            active: ActiveCue::default(),
            media: None,
            pending_rename: None,
            service,
            snapshots,
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Receive a snapshot after every change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// The latest snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// The transcript being edited
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Pending speaker renames
    pub fn speaker_map(&self) -> &BTreeMap<String, String> {
        self.speakers.map()
    }

    /// Remote operation in flight, if any
    pub fn busy(&self) -> Option<BusyMode> {
        self.snapshots.borrow().busy
    }

    /// Message of the last failed remote operation
    pub fn last_error(&self) -> Option<String> {
        self.snapshots.borrow().last_error.clone()
    }

    /// Media used by remote operations
    pub fn media(&self) -> Option<&MediaFile> {
        self.media.as_ref()
    }

    /// Set the media used by remote operations
    pub fn load_media(&mut self, media: MediaFile) {
        debug!("Session {} using media {}", self.id, media.file_name);
        self.media = Some(media);
    }

    /// Replace the transcript, e.g. after opening a file
    pub fn load_transcript(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.speakers.clear();
        self.pending_rename = None;
        self.locator.reset();
        self.active = ActiveCue::default();
        self.publish();
    }

    /// Split a segment at a character offset. See [`Transcript::split`].
    pub fn split(&mut self, index: usize, cursor_offset: usize) -> bool {
        self.apply(|transcript| transcript.split(index, cursor_offset))
    }

    /// Merge a segment with the next one. See [`Transcript::merge_down`].
    pub fn merge_down(&mut self, index: usize) -> bool {
        self.apply(|transcript| transcript.merge_down(index))
    }

    /// Replace a segment's text
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        self.apply(|transcript| transcript.set_text(index, text))
    }

    /// Replace a segment's speaker
    pub fn set_speaker(&mut self, index: usize, speaker: impl Into<String>) -> bool {
        self.apply(|transcript| transcript.set_speaker(index, speaker))
    }

    /// Handle a pick from a segment's speaker selector.
    ///
    /// `Select` assigns the name to the segment. `RequestRename` opens a
    /// rename of the segment's current speaker, finished by
    /// [`EditorSession::complete_rename`]; it does nothing for a segment
    /// without a speaker.
    pub fn choose_speaker(&mut self, index: usize, choice: SpeakerChoice) -> bool {
        match choice {
            SpeakerChoice::Select(name) => self.set_speaker(index, name),
            SpeakerChoice::RequestRename => {
                match self.transcript.get(index).and_then(|s| s.speaker.clone()) {
                    Some(speaker) => {
                        debug!("Rename requested for speaker '{}'", speaker);
                        self.pending_rename = Some(speaker);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Speaker whose rename was requested and not yet completed
    pub fn pending_rename(&self) -> Option<&str> {
        self.pending_rename.as_deref()
    }

    /// Finish a requested rename. Returns the number of segments relabelled.
    pub fn complete_rename(&mut self, new_name: &str) -> usize {
        match self.pending_rename.take() {
            Some(old_name) => self.rename_speaker(&old_name, new_name),
            None => 0,
        }
    }

    /// Abandon a requested rename
    pub fn cancel_rename(&mut self) {
        self.pending_rename = None;
    }

    /// Rename a speaker locally and record it for the next commit
    pub fn rename_speaker(&mut self, old_name: &str, new_name: &str) -> usize {
        let relabelled = self.speakers.rename(&mut self.transcript, old_name, new_name);
        self.publish();
        relabelled
    }

    /// Update the highlight for playback time `t`
    pub fn tick(&mut self, t: f64) -> ActiveCue {
        self.active = self.locator.locate(self.transcript.segments(), t);
        self.active
    }

    /// Update the highlight from the player's clock
    pub fn follow(&mut self, player: &dyn MediaPlayer) -> ActiveCue {
        self.tick(player.current_time())
    }

    /// Seek the player to the start of a segment
    pub fn seek_to_segment(&mut self, index: usize, player: &mut dyn MediaPlayer) -> bool {
        let Some(start) = self.transcript.get(index).map(|s| s.start) else {
            return false;
        };

        player.seek(start);
        self.tick(start);
        true
    }

    /// Highlight computed by the last tick
    pub fn active_cue(&self) -> ActiveCue {
        self.active
    }

    /// Render the transcript as SRT
    pub fn export(&self, options: &ExportOptions) -> String {
        subtitle_processor::export(self.transcript.segments(), options)
    }

    /// Transcribe the loaded media, replacing the transcript
    pub async fn transcribe(&mut self) -> Result<(), EditorError> {
        let media = self.require_media()?;

        self.run_remote(BusyMode::Transcribing, move |service| async move {
            service.transcribe(&media).await
        })
        .await
    }

    /// Re-time the current text against the loaded media.
    ///
    /// Text edits are kept because the text is what gets sent; timing,
    /// speakers and words come back from the service.
    pub async fn resync(&mut self) -> Result<(), EditorError> {
        let media = self.require_media()?;
        let text = self.transcript.joined_text();

        self.run_remote(BusyMode::Resyncing, move |service| async move {
            service.resync(&media, &text).await
        })
        .await
    }

    /// Send pending renames to the service and adopt its segments.
    ///
    /// With no pending renames nothing is sent.
    pub async fn commit_renames(&mut self) -> Result<(), EditorError> {
        if self.speakers.is_empty() {
            debug!("No pending speaker renames to commit");
            return Ok(());
        }

        let segments = self.transcript.segments().to_vec();
        let speaker_map = self.speakers.map().clone();

        self.run_remote(BusyMode::Renaming, move |service| async move {
            service.rename_speakers(&segments, &speaker_map).await
        })
        .await
    }

    /// Re-run speaker attribution on the loaded media
    pub async fn refine_diarization(&mut self) -> Result<(), EditorError> {
        let media = self.require_media()?;
        let segments = self.transcript.segments().to_vec();

        self.run_remote(BusyMode::Refining, move |service| async move {
            service.refine_diarization(&media, &segments).await
        })
        .await
    }

    fn require_media(&self) -> Result<MediaFile, EditorError> {
        match &self.media {
            Some(media) => Ok(media.clone()),
            None => {
                let error = EditorError::NoMedia;
                self.snapshots.send_modify(|snapshot| snapshot.last_error = Some(error.to_string()));
                Err(error)
            }
        }
    }

    /// Run one remote call under the busy gate.
    ///
    /// On success the transcript is replaced and a snapshot published
    /// before the session goes idle. On failure the transcript and renames
    /// are untouched and the error message is published.
    async fn run_remote<F, Fut>(&mut self, mode: BusyMode, call: F) -> Result<(), EditorError>
    where
        F: FnOnce(Arc<dyn SubtitleService>) -> Fut,
        Fut: Future<Output = Result<Vec<Segment>, ServiceError>>,
    {
        // `&mut self` held across the await already excludes a second call;
        // this only guards against a published busy state left behind
        if let Some(current) = self.busy() {
            warn!("Rejecting {} while {}", mode, current);
            return Err(EditorError::Busy(current));
        }

        let guard = BusyGuard::enter(&self.snapshots, mode);

        match call(Arc::clone(&self.service)).await {
            Ok(segments) => {
                info!("Finished {}: {} segment(s)", mode, segments.len());
                self.transcript.replace_all(segments);
                if matches!(mode, BusyMode::Transcribing | BusyMode::Renaming) {
                    self.speakers.clear();
                }
                self.pending_rename = None;
                self.locator.reset();
                self.active = ActiveCue::default();
                self.publish();
                drop(guard);
                Ok(())
            }
            Err(e) => {
                guard.fail(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Apply a local edit, publishing when it changed something
    fn apply<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut Transcript) -> bool,
    {
        let applied = edit(&mut self.transcript);
        if applied {
            self.publish();
        }
        applied
    }

    fn publish(&self) {
        let segments: Arc<[Segment]> = Arc::from(self.transcript.segments());
        let speaker_map = self.speakers.map().clone();

        self.snapshots.send_modify(|snapshot| {
            snapshot.revision += 1;
            snapshot.segments = segments;
            snapshot.speaker_map = speaker_map;
        });
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("id", &self.id)
            .field("segments", &self.transcript.len())
            .field("pending_renames", &self.speakers.len())
            .field("media", &self.media.as_ref().map(|m| &m.file_name))
            .finish()
    }
}
