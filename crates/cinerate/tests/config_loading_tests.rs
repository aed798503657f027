//! Table-driven tests for client configuration loading and validation.

use std::io::Write;

use cinerate::config::{load_config, load_config_from_str, HealthInterval, LogFormat};
use cinerate::{CinerateClient, ConfigError};

/// Represents a single config loading test case.
struct ConfigTestCase {
    name: &'static str,
    config_json: &'static str,
    should_succeed: bool,
    /// Expected error substring (if should_succeed is false).
    expected_error: Option<&'static str>,
}

const CONFIG_TESTS: &[ConfigTestCase] = &[
    ConfigTestCase {
        name: "valid_minimal",
        config_json: r#"{ "version": "1.0" }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "valid_full",
        config_json: r#"{
            "version": "1.0",
            "backend": {
                "base_url": "https://rating.example.com/api/v1",
                "connect_timeout_secs": 10,
                "request_timeout_secs": 60
            },
            "analysis": { "poll_interval_ms": 1500 },
            "upload": { "max_bytes": 1048576, "allowed_extensions": ["pdf", "fdx"] },
            "health": { "enabled": true, "interval": "60s", "error_log_capacity": 100 },
            "logging": { "filter": "cinerate=debug", "format": "json" }
        }"#,
        should_succeed: true,
        expected_error: None,
    },
    ConfigTestCase {
        name: "missing_version",
        config_json: r#"{ "backend": {} }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_version",
        config_json: r#"{ "version": "2.0" }"#,
        should_succeed: false,
        expected_error: Some("Unsupported config version"),
    },
    ConfigTestCase {
        name: "unknown_field",
        config_json: r#"{ "version": "1.0", "retries": 3 }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "interval_outside_fixed_set",
        config_json: r#"{ "version": "1.0", "health": { "interval": "45s" } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "poll_interval_too_small",
        config_json: r#"{ "version": "1.0", "analysis": { "poll_interval_ms": 10 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "zero_timeout",
        config_json: r#"{ "version": "1.0", "backend": { "connect_timeout_secs": 0 } }"#,
        should_succeed: false,
        expected_error: Some("Schema validation failed"),
    },
    ConfigTestCase {
        name: "unsupported_url_scheme",
        config_json: r#"{ "version": "1.0", "backend": { "base_url": "ftp://backend/api" } }"#,
        should_succeed: false,
        expected_error: Some("unsupported scheme"),
    },
    ConfigTestCase {
        name: "unparseable_url",
        config_json: r#"{ "version": "1.0", "backend": { "base_url": "not a url" } }"#,
        should_succeed: false,
        expected_error: Some("Invalid backend URL"),
    },
    ConfigTestCase {
        name: "no_allowed_extensions",
        config_json: r#"{ "version": "1.0", "upload": { "allowed_extensions": [] } }"#,
        should_succeed: false,
        expected_error: Some("At least one upload extension"),
    },
    ConfigTestCase {
        name: "invalid_json",
        config_json: r#"{ "version": "1.0", "#,
        should_succeed: false,
        expected_error: Some("Failed to parse config JSON"),
    },
];

#[test]
fn test_config_loading_table() {
    for case in CONFIG_TESTS {
        let result = load_config_from_str(case.config_json);
        if case.should_succeed {
            assert!(
                result.is_ok(),
                "case '{}' should succeed: {:?}",
                case.name,
                result.err()
            );
        } else {
            let err = result.err().unwrap_or_else(|| {
                panic!("case '{}' should fail", case.name);
            });
            let expected = case.expected_error.unwrap_or_default();
            assert!(
                err.to_string().contains(expected),
                "case '{}': expected '{}' in '{}'",
                case.name,
                expected,
                err
            );
        }
    }
}

#[test]
fn test_full_config_values() {
    let config = load_config_from_str(CONFIG_TESTS[1].config_json).unwrap();
    assert_eq!(config.backend.request_timeout_secs, 60);
    assert_eq!(config.analysis.poll_interval().as_millis(), 1500);
    assert_eq!(config.upload.allowed_extensions, vec!["pdf", "fdx"]);
    assert!(config.health.enabled);
    assert_eq!(config.health.interval, HealthInterval::OneMinute);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_load_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "version": "1.0", "health": {{ "interval": "10s" }} }}"#
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.health.interval, HealthInterval::TenSeconds);
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[tokio::test]
async fn test_client_from_loaded_config() {
    let config = load_config_from_str(CONFIG_TESTS[1].config_json).unwrap();
    let client = CinerateClient::from_config(&config).unwrap();
    assert_eq!(client.analysis.poll_interval().as_millis(), 1500);
    assert_eq!(
        client.config().backend.base_url,
        "https://rating.example.com/api/v1"
    );
}
