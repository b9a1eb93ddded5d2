use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::EditorError;
use crate::file_utils::{self, FileManager, FileType, MediaFile};
use crate::service::{HttpSubtitleService, SubtitleService};
use crate::session::EditorSession;
use crate::subtitle_processor::{ExportOptions, SubtitleCollection};
use crate::transcript::{ActiveCue, Transcript, TranscriptStats};

// @module: Application controller for transcript editing commands

/// Runs one command against files on disk.
///
/// Every command opens a fresh [`EditorSession`], applies one operation and
/// writes the result back.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Service used by remote operations
    service: Arc<dyn SubtitleService>,
}

impl Controller {
    // @method: Create a controller talking to the configured HTTP service
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let service = Arc::new(HttpSubtitleService::from_config(&config.service));
        Ok(Self::with_service(config, service))
    }

    // @method: Create a controller with an explicit service
    pub fn with_service(config: Config, service: Arc<dyn SubtitleService>) -> Self {
        Self { config, service }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Transcribe a media file into a transcript JSON file.
    ///
    /// Writes next to the media as `<stem>.json` unless `output` is given.
    pub async fn transcribe(&self, media_path: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<PathBuf> {
        let media = MediaFile::open(media_path)?;
        let output_path = output.unwrap_or_else(|| {
            FileManager::generate_output_path(media_path, parent_dir(media_path), "json")
        });
        file_utils::check_overwrite(&output_path, force_overwrite)?;

        let mut session = self.session(Transcript::new());
        session.load_media(media);

        self.run_remote("Transcribing", session.transcribe()).await?;
        self.save(&session, &output_path)
    }

    /// Re-time a transcript against its media.
    ///
    /// The transcript file is rewritten unless `output` is given.
    pub async fn resync(
        &self,
        media_path: &Path,
        transcript_path: &Path,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let media = MediaFile::open(media_path)?;
        let output_path = self.edit_output_path(transcript_path, output, force_overwrite)?;

        let mut session = self.session(Self::open_transcript(transcript_path)?);
        session.load_media(media);

        self.run_remote("Resyncing", session.resync()).await?;
        self.save(&session, &output_path)
    }

    /// Re-run speaker attribution for a transcript
    pub async fn refine(
        &self,
        media_path: &Path,
        transcript_path: &Path,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let media = MediaFile::open(media_path)?;
        let output_path = self.edit_output_path(transcript_path, output, force_overwrite)?;

        let mut session = self.session(Self::open_transcript(transcript_path)?);
        session.load_media(media);

        self.run_remote("Refining speakers", session.refine_diarization()).await?;
        self.save(&session, &output_path)
    }

    /// Apply speaker renames in order, then commit them to the service
    /// unless `commit` is false
    pub async fn rename(
        &self,
        transcript_path: &Path,
        renames: &[(String, String)],
        commit: bool,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let output_path = self.edit_output_path(transcript_path, output, force_overwrite)?;
        let mut session = self.session(Self::open_transcript(transcript_path)?);

        for (old_name, new_name) in renames {
            let relabelled = session.rename_speaker(old_name, new_name);
            if relabelled == 0 {
                warn!("No segment is labelled '{}'", old_name);
            } else {
                info!("Renamed '{}' to '{}' on {} segment(s)", old_name, new_name, relabelled);
            }
        }

        if commit {
            self.run_remote("Renaming speakers", session.commit_renames()).await?;
        } else {
            debug!("Keeping {} rename(s) local", session.speaker_map().len());
        }

        self.save(&session, &output_path)
    }

    /// Split a segment at a character offset
    pub fn split(
        &self,
        transcript_path: &Path,
        index: usize,
        cursor_offset: usize,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        self.apply_local_edit(transcript_path, output, force_overwrite, |session| {
            session.split(index, cursor_offset)
        })
    }

    /// Merge a segment with the next one
    pub fn merge(
        &self,
        transcript_path: &Path,
        index: usize,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        self.apply_local_edit(transcript_path, output, force_overwrite, |session| session.merge_down(index))
    }

    /// Replace a segment's text
    pub fn set_text(
        &self,
        transcript_path: &Path,
        index: usize,
        text: &str,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        self.apply_local_edit(transcript_path, output, force_overwrite, |session| session.set_text(index, text))
    }

    /// Replace a segment's speaker
    pub fn set_speaker(
        &self,
        transcript_path: &Path,
        index: usize,
        speaker: &str,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        self.apply_local_edit(transcript_path, output, force_overwrite, |session| {
            session.set_speaker(index, speaker)
        })
    }

    /// Segment and word active at `seconds`
    pub fn locate(&self, transcript_path: &Path, seconds: f64) -> Result<(Transcript, ActiveCue)> {
        let mut session = self.session(Self::open_transcript(transcript_path)?);
        let cue = session.tick(seconds);
        Ok((session.transcript().clone(), cue))
    }

    /// Convert an SRT file into a transcript JSON file
    pub fn import_srt(&self, srt_path: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<PathBuf> {
        let segments = SubtitleCollection::parse_srt_file(srt_path)?;
        info!("Imported {} cue(s) from {:?}", segments.len(), srt_path);

        let output_path = output.unwrap_or_else(|| {
            FileManager::generate_output_path(srt_path, parent_dir(srt_path), "json")
        });
        file_utils::check_overwrite(&output_path, force_overwrite)?;

        FileManager::save_transcript(&output_path, &Transcript::from_segments(segments))?;
        Ok(output_path)
    }

    /// Export a transcript as SRT.
    ///
    /// Writes next to the transcript as `<stem>.srt` unless `output` is given.
    pub fn export(
        &self,
        transcript_path: &Path,
        output: Option<PathBuf>,
        options: &ExportOptions,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let transcript = Self::open_transcript(transcript_path)?;
        let output_path = output.unwrap_or_else(|| {
            FileManager::generate_output_path(transcript_path, parent_dir(transcript_path), "srt")
        });

        if output_path == transcript_path {
            return Err(anyhow!("Export would overwrite its own input: {:?}", transcript_path));
        }
        file_utils::check_overwrite(&output_path, force_overwrite)?;

        let collection = SubtitleCollection::from_transcript(transcript_path.to_path_buf(), &transcript, options);
        collection.write_to_srt(&output_path)?;
        info!("Exported {} cue(s) to {:?}", collection.entries.len(), output_path);
        Ok(output_path)
    }

    /// Statistics for a transcript
    pub fn info(&self, transcript_path: &Path) -> Result<TranscriptStats> {
        Ok(Self::open_transcript(transcript_path)?.stats())
    }

    /// Check the configured service answers
    pub async fn test_connection(&self) -> Result<()> {
        self.service
            .test_connection()
            .await
            .with_context(|| format!("Service not reachable at {}", self.config.service.endpoint))
    }

    /// Load a transcript from JSON, or from SRT by extension
    pub fn open_transcript(path: &Path) -> Result<Transcript> {
        if !FileManager::file_exists(path) {
            return Err(anyhow!("Input file does not exist: {:?}", path));
        }

        match FileManager::detect_file_type(path) {
            FileType::Subtitle => Ok(Transcript::from_segments(SubtitleCollection::parse_srt_file(path)?)),
            _ => FileManager::load_transcript(path),
        }
    }

    fn session(&self, transcript: Transcript) -> EditorSession {
        EditorSession::with_transcript(Arc::clone(&self.service), transcript)
    }

    /// Where an edit command writes: the input itself, or `output` when
    /// given and free to write
    fn edit_output_path(&self, input: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<PathBuf> {
        match output {
            Some(path) if path != input => {
                file_utils::check_overwrite(&path, force_overwrite)?;
                Ok(path)
            }
            _ => Ok(input.to_path_buf()),
        }
    }

    /// Load, edit and save a transcript. Returns `None` and writes nothing
    /// when the edit did not apply.
    fn apply_local_edit<F>(
        &self,
        transcript_path: &Path,
        output: Option<PathBuf>,
        force_overwrite: bool,
        edit: F,
    ) -> Result<Option<PathBuf>>
    where
        F: FnOnce(&mut EditorSession) -> bool,
    {
        let output_path = self.edit_output_path(transcript_path, output, force_overwrite)?;
        let mut session = self.session(Self::open_transcript(transcript_path)?);

        if !edit(&mut session) {
            warn!("Edit had no effect, {:?} left unchanged", transcript_path);
            return Ok(None);
        }

        self.save(&session, &output_path).map(Some)
    }

    fn save(&self, session: &EditorSession, output_path: &Path) -> Result<PathBuf> {
        FileManager::save_transcript(output_path, session.transcript())?;
        info!("Saved {} segment(s) to {:?}", session.transcript().len(), output_path);
        Ok(output_path.to_path_buf())
    }

    /// Await a remote session operation behind a spinner
    async fn run_remote<F>(&self, label: &str, operation: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<(), EditorError>>,
    {
        let start_time = Instant::now();
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(format!("{}...", label));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = operation.await;
        spinner.finish_and_clear();

        match result {
            Ok(()) => {
                info!("{} completed in {}.", label, Self::format_duration(start_time.elapsed()));
                Ok(())
            }
            Err(e) => Err(anyhow!("{} failed: {}", label, e)),
        }
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    path.parent().unwrap_or(Path::new("."))
}
