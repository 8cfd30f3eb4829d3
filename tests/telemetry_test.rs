//! Telemetry module tests for the bridge.

use llamabridge::telemetry::{
    init_logging, record_generation, record_init, record_stop, BridgeSpan, LogConfig, LogError,
    LogFormat, SpanExt,
};
use llamabridge::BridgeError;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Span;

// =============================================================================
// LogConfig Tests
// =============================================================================

#[test]
fn log_config_default_is_pretty_info() {
    let config = LogConfig::default();
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.level, "info");
    assert!(config.output_path.is_none());
}

#[test]
fn log_format_equality() {
    assert_eq!(LogFormat::Json, LogFormat::Json);
    assert_ne!(LogFormat::Json, LogFormat::Pretty);
}

// =============================================================================
// LogError Tests
// =============================================================================

#[test]
fn log_error_invalid_filter_display() {
    let error = LogError::InvalidFilter("bad filter".to_string());
    assert!(error.to_string().contains("Invalid log filter"));
    assert!(error.to_string().contains("bad filter"));
}

#[test]
fn log_error_already_initialized_display() {
    let error = LogError::AlreadyInitialized;
    assert!(error.to_string().contains("already initialized"));
}

#[test]
fn init_logging_rejects_bad_filter() {
    let config = LogConfig {
        format: LogFormat::Json,
        level: "llamabridge=loud".to_string(),
        output_path: None,
    };
    assert!(matches!(init_logging(&config), Err(LogError::InvalidFilter(_))));
}

#[test]
fn init_logging_reports_unwritable_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = LogConfig {
        format: LogFormat::Json,
        level: "info".to_string(),
        output_path: Some(dir.path().join("no-such-dir").join("bridge.log")),
    };
    assert!(matches!(init_logging(&config), Err(LogError::FileOpen(_))));
}

#[test]
fn init_logging_to_file_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("bridge.log");
    let config = LogConfig {
        format: LogFormat::Pretty,
        level: "info".to_string(),
        output_path: Some(path.clone()),
    };
    assert!(init_logging(&config).is_ok());
    assert!(path.exists());
    assert!(matches!(init_logging(&config), Err(LogError::AlreadyInitialized)));
}

// =============================================================================
// Span Tests
// =============================================================================

#[test]
fn span_ext_record_result_ok() {
    let span = Span::none();
    let result: Result<i32, &str> = Ok(42);
    span.record_result(&result);
}

#[test]
fn span_ext_record_result_err() {
    let span = BridgeSpan::new("generate");
    let _guard = span.enter();
    let result: Result<(), BridgeError> = Err(BridgeError::NotInitialized);
    span.record_result(&result);
}

// =============================================================================
// Metrics Tests
// =============================================================================

#[test]
fn record_metrics_without_recorder() {
    record_init(&Ok(()));
    record_init(&Err(BridgeError::EmptyModelPath));
    record_generation(&Ok::<_, BridgeError>("text"), Duration::from_millis(3));
    record_generation::<()>(&Err(BridgeError::Cancelled), Duration::ZERO);
    record_stop();
}
