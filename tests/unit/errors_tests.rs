/*!
 * Tests for error types
 */

use subtitler::errors::{AppError, EditorError, ServiceError};
use subtitler::session::BusyMode;

#[test]
fn test_userMessage_withApiError_shouldBeServiceDetailOnly() {
    let error = ServiceError::ApiError {
        status_code: 400,
        message: "Invalid file type.".to_string(),
    };

    assert_eq!(error.user_message(), "Invalid file type.");
    assert_eq!(error.to_string(), "Service responded with error: 400 - Invalid file type.");
}

#[test]
fn test_userMessage_withOtherErrors_shouldUseDisplay() {
    let error = ServiceError::ConnectionError("refused".to_string());
    assert_eq!(error.user_message(), "Connection error: refused");
}

#[test]
fn test_editorError_fromServiceError_shouldWrap() {
    let error: EditorError = ServiceError::ParseError("bad json".to_string()).into();

    assert!(matches!(error, EditorError::Service(ServiceError::ParseError(_))));
    assert!(error.to_string().contains("bad json"));
}

#[test]
fn test_editorError_busy_shouldNameOperation() {
    let error = EditorError::Busy(BusyMode::Resyncing);
    assert_eq!(error.to_string(), "Another operation is in progress: resyncing");
    assert_eq!(EditorError::NoMedia.to_string(), "No media file loaded");
}

#[test]
fn test_appError_conversions_shouldPickMatchingVariant() {
    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("odd").into();
    assert!(matches!(from_anyhow, AppError::Unknown(ref msg) if msg == "odd"));

    let from_editor: AppError = EditorError::NoMedia.into();
    assert!(matches!(from_editor, AppError::Editor(EditorError::NoMedia)));

    let from_service: AppError = ServiceError::InvalidMedia("x.txt".to_string()).into();
    assert!(matches!(from_service, AppError::Service(ServiceError::InvalidMedia(_))));
}
