/*!
 * Error types for the subtitler application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::session::BusyMode;

/// Errors that can occur when talking to the subtitle-generation service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Error when sending a request fails
    #[error("Service request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a service response fails
    #[error("Failed to parse service response: {0}")]
    ParseError(String),

    /// Error returned by the service itself
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Message extracted from the response, or a generic one
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The file cannot be sent as media
    #[error("Invalid media file: {0}")]
    InvalidMedia(String),
}

impl ServiceError {
    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors surfaced by an editing session
#[derive(Error, Debug)]
pub enum EditorError {
    /// A remote operation is already in flight
    #[error("Another operation is in progress: {0}")]
    Busy(BusyMode),

    /// The operation needs a media file and none is loaded
    #[error("No media file loaded")]
    NoMedia,

    /// The remote service call failed
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the subtitle service
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Error from an editing session
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
