//! Integration tests for configuration loading
//!
//! Exercises the full path file → parse → validate, and checks that each
//! phase reports its own error variant with the offending path.

use gpt_relay::config::Config;
use gpt_relay::error::AppError;
use std::io::Write;
use tempfile::NamedTempFile;

fn create_temp_config(toml_content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(toml_content.as_bytes())
        .expect("Failed to write temp file");
    temp_file.flush().expect("Failed to flush temp file");
    temp_file
}

#[test]
fn test_full_config_loads() {
    let temp_file = create_temp_config(
        r#"
[server]
host = "127.0.0.1"
port = 8787

[upstream]
base_url = "https://llm.internal.example/v1"
user_agent = "acme-relay/2"
default_model = "gpt-4o"
default_max_tokens = 1024
default_temperature = 0.5
timeout_seconds = 90

[observability]
log_level = "debug"
"#,
    );

    let config = Config::from_file(temp_file.path()).expect("config should load");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8787);
    assert_eq!(
        config.upstream.chat_completions_url(),
        "https://llm.internal.example/v1/chat/completions"
    );
    assert_eq!(config.upstream.user_agent(), "acme-relay/2");
    assert_eq!(config.upstream.default_model(), "gpt-4o");
    assert_eq!(config.upstream.default_max_tokens(), 1024);
    assert_eq!(config.upstream.default_temperature(), 0.5);
    assert_eq!(config.upstream.timeout_seconds(), Some(90));
    assert_eq!(config.observability.log_level, "debug");
}

#[test]
fn test_empty_file_is_all_defaults() {
    let temp_file = create_temp_config("");
    let config = Config::from_file(temp_file.path()).expect("empty config should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.upstream.default_model(), "gpt-4o-mini");
}

#[test]
fn test_missing_file_is_read_error() {
    use std::error::Error;

    let result = Config::from_file("/nonexistent/path/to/gpt-relay.toml");

    match &result {
        Err(AppError::ConfigFileRead { path, source }) => {
            assert!(path.contains("/nonexistent/path/to/gpt-relay.toml"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("Expected ConfigFileRead, got {:?}", other),
    }

    let err = result.unwrap_err();
    assert!(
        err.source()
            .expect("should carry io::Error source")
            .is::<std::io::Error>()
    );
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let temp_file = create_temp_config("[server\nport = 3000\n");

    match Config::from_file(temp_file.path()) {
        Err(AppError::ConfigParseFailed { path, .. }) => {
            assert!(path.contains(&temp_file.path().display().to_string()));
        }
        other => panic!("Expected ConfigParseFailed, got {:?}", other),
    }
}

#[test]
fn test_wrong_type_is_parse_error() {
    let temp_file = create_temp_config("[server]\nport = \"three thousand\"\n");

    assert!(matches!(
        Config::from_file(temp_file.path()),
        Err(AppError::ConfigParseFailed { .. })
    ));
}

#[test]
fn test_invalid_values_are_validation_errors() {
    let cases = [
        ("[upstream]\nbase_url = \"api.openai.com/v1\"\n", "base_url"),
        ("[upstream]\ndefault_temperature = -0.1\n", "default_temperature"),
        ("[upstream]\ntimeout_seconds = 0\n", "timeout_seconds"),
        ("[upstream]\ndefault_model = \"  \"\n", "default_model"),
        ("[server]\nmax_body_bytes = 0\n", "max_body_bytes"),
        ("[observability]\nlog_level = \"loud\"\n", "log_level"),
    ];

    for (toml_content, field) in cases {
        let temp_file = create_temp_config(toml_content);
        match Config::from_file(temp_file.path()) {
            Err(AppError::ConfigValidationFailed { reason, .. }) => {
                assert!(
                    reason.contains(field),
                    "reason for {:?} should mention {}, got: {}",
                    toml_content,
                    field,
                    reason
                );
            }
            other => panic!(
                "Expected ConfigValidationFailed for {:?}, got {:?}",
                toml_content, other
            ),
        }
    }
}

#[test]
fn test_load_with_explicit_path() {
    let temp_file = create_temp_config("[server]\nport = 4001\n");
    let config = Config::load(Some(temp_file.path())).expect("should load explicit path");
    assert_eq!(config.server.port, 4001);
}

#[test]
fn test_load_with_missing_explicit_path_fails() {
    let result = Config::load(Some(std::path::Path::new("/nonexistent/relay.toml")));
    assert!(matches!(result, Err(AppError::ConfigFileRead { .. })));
}
