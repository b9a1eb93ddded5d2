/*!
 * Tests for application configuration
 */

use anyhow::Result;
use log::LevelFilter;

use subtitler::app_config::{Config, LogLevel, ServiceConfig};
use subtitler::errors::AppError;
use crate::common;

#[test]
fn test_default_shouldUseLocalServiceAndPlainExport() {
    let config = Config::default();

    assert_eq!(config.service.endpoint, "http://localhost:8000");
    assert_eq!(config.service.timeout_secs, 600);
    assert_eq!(config.service.max_retries, 3);
    assert_eq!(config.service.retry_backoff_ms, 1000);
    assert!(config.export.include_speaker);
    assert!(!config.export.wrap);
    assert_eq!(config.export.max_lines, 2);
    assert_eq!(config.export.max_chars, 42);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{"service": {"endpoint": "https://subs.example.com"}, "export": {"wrap": true}, "log_level": "debug"}"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.service.endpoint, "https://subs.example.com");
    assert_eq!(config.service.timeout_secs, 600);
    assert!(config.export.wrap);
    assert_eq!(config.export.max_chars, 42);
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_deserialize_withEmptyObject_shouldEqualDefault() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.service, ServiceConfig::default());
    assert_eq!(config.export, Config::default().export);
}

#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.service.endpoint = "not a url".to_string();

    assert!(matches!(config.validate(), Err(AppError::Config(_))));

    config.service.endpoint = "ftp://example.com".to_string();
    assert!(matches!(config.validate(), Err(AppError::Config(_))));
}

#[test]
fn test_validate_withZeroLimits_shouldFail() {
    let mut config = Config::default();
    config.service.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.export.max_lines = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.export.max_chars = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.service, ServiceConfig::default());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.service, config.service);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
}
