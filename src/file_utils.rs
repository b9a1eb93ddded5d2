use anyhow::{Result, Context, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ServiceError;
use crate::transcript::{Segment, Transcript};

// @module: File and media utilities

const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wma", "audio/x-ms-wma"),
];

const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("webm", "video/webm"),
    ("m4v", "video/x-m4v"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("ogv", "video/ogg"),
    ("ts", "video/mp2t"),
];

/// Enum representing different file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Audio file accepted by the service
    Audio,
    /// Video file accepted by the service
    Video,
    /// Subtitle file (SRT)
    Subtitle,
    /// Transcript JSON file
    Transcript,
    /// Unknown file type
    Unknown,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Output path next to the input, with a new extension
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        extension: &str,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(extension.trim_start_matches('.'));

        output_dir.as_ref().join(output_filename)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// MIME type of an audio or video file, from its extension
    pub fn media_mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();

        AUDIO_EXTENSIONS
            .iter()
            .chain(VIDEO_EXTENSIONS.iter())
            .find(|(known, _)| *known == ext)
            .map(|(_, mime)| *mime)
    }

    /// Detect the kind of file from its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let path = path.as_ref();
        let Some(ext) = path.extension() else {
            return FileType::Unknown;
        };
        let ext = ext.to_string_lossy().to_lowercase();

        if ext == "srt" {
            FileType::Subtitle
        } else if ext == "json" {
            FileType::Transcript
        } else if AUDIO_EXTENSIONS.iter().any(|(known, _)| *known == ext) {
            FileType::Audio
        } else if VIDEO_EXTENSIONS.iter().any(|(known, _)| *known == ext) {
            FileType::Video
        } else {
            FileType::Unknown
        }
    }

    /// Load a transcript JSON file.
    ///
    /// Accepts `{"segments": [...]}` as written by [`FileManager::save_transcript`]
    /// and the service responses, or a bare segment array.
    pub fn load_transcript<P: AsRef<Path>>(path: P) -> Result<Transcript> {
        let path = path.as_ref();
        let content = Self::read_to_string(path)?;

        let document: TranscriptDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse transcript file: {:?}", path))?;

        Ok(Transcript::from_segments(document.into_segments()))
    }

    /// Save a transcript as pretty-printed JSON
    pub fn save_transcript<P: AsRef<Path>>(path: P, transcript: &Transcript) -> Result<()> {
        let document = TranscriptDocument::Wrapped {
            segments: transcript.segments().to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)
            .context("Failed to serialize transcript to JSON")?;

        Self::write_to_file(path, &json)
    }
}

/// On-disk transcript layouts
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Wrapped { segments: Vec<Segment> },
    Bare(Vec<Segment>),
}

impl TranscriptDocument {
    fn into_segments(self) -> Vec<Segment> {
        match self {
            Self::Wrapped { segments } | Self::Bare(segments) => segments,
        }
    }
}

/// An audio or video file to send to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Location on disk
    pub path: PathBuf,
    /// File name sent with the upload
    pub file_name: String,
    /// `audio/*` or `video/*` MIME type
    pub mime_type: String,
}

impl MediaFile {
    /// Open a media file, checking it exists and is audio or video
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ServiceError::InvalidMedia(format!("File does not exist: {}", path.display())));
        }

        let mime_type = FileManager::media_mime_type(path).ok_or_else(|| {
            ServiceError::InvalidMedia(format!("Not an audio or video file: {}", path.display()))
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "media".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            mime_type: mime_type.to_string(),
        })
    }

    /// Read the whole file for upload
    pub async fn read_bytes(&self) -> Result<Vec<u8>, ServiceError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| ServiceError::InvalidMedia(format!("Failed to read {}: {}", self.path.display(), e)))
    }
}

/// Fail when `path` exists and overwriting was not requested
pub fn check_overwrite<P: AsRef<Path>>(path: P, force_overwrite: bool) -> Result<()> {
    let path = path.as_ref();
    if path.exists() && !force_overwrite {
        return Err(anyhow!("Output file already exists: {:?}. Use -f to force overwrite.", path));
    }
    Ok(())
}
