// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Ampwatch configuration system.

use ampwatch_config::diagnostic::ConfigError;
use ampwatch_config::model::AmpwatchConfig;
use ampwatch_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_ampwatch_config() {
    let toml = r#"
[portal]
base_url = "https://portal.example.edu:8081"
sid = "2023040001"
password = "secret"
cust_id = "1234"
request_timeout_secs = 10

[poll]
enabled = false
interval_secs = 300
timezone = "Europe/Berlin"
record_identity = true

[storage]
database_path = "/tmp/ampwatch.db"
wal_mode = false
max_retries = 5
retry_delay_secs = 1

[gateway]
enabled = true
host = "0.0.0.0"
port = 9000
access_token = "tok"

[logging]
level = "debug"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.portal.base_url, "https://portal.example.edu:8081");
    assert_eq!(config.portal.sid, "2023040001");
    assert_eq!(config.portal.cust_id.as_deref(), Some("1234"));
    assert_eq!(config.portal.request_timeout_secs, 10);
    assert!(!config.poll.enabled);
    assert_eq!(config.poll.interval_secs, 300);
    assert_eq!(config.poll.timezone, "Europe/Berlin");
    assert!(config.poll.record_identity);
    assert_eq!(config.storage.database_path, "/tmp/ampwatch.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.max_retries, 5);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.access_token.as_deref(), Some("tok"));
    assert_eq!(config.logging.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.portal.base_url, "http://cw.gxjzy.com:8081");
    assert!(config.portal.cust_id.is_none());
    assert!(config.poll.enabled);
    assert_eq!(config.poll.interval_secs, 600);
    assert_eq!(config.poll.timezone, "Asia/Shanghai");
    assert!(!config.poll.record_identity);
    assert!(config.storage.wal_mode);
    assert_eq!(config.storage.max_retries, 3);
    assert_eq!(config.storage.retry_delay_secs, 5);
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8088);
    assert!(config.gateway.access_token.is_none());
    assert_eq!(config.logging.level, "info");
}

/// Dot-notation overrides, as produced by the env provider, win over TOML.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: AmpwatchConfig = Figment::new()
        .merge(Serialized::defaults(AmpwatchConfig::default()))
        .merge(Toml::string("[portal]\nsid = \"from-toml\"\n"))
        .merge(("portal.sid", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.portal.sid, "from-env");
}

/// Unknown key in [portal] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_suggests_correction() {
    let toml = r#"
[portal]
pasword = "x"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "pasword"
                && suggestion.as_deref() == Some("password")
                && valid_keys.contains("base_url")
        })
    });
    assert!(found, "expected UnknownKey for `pasword`, got: {errors:?}");
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_top_level_section_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n")
        .expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "got: {err_str}"
    );
}

/// Wrong value type produces an InvalidType diagnostic naming the key.
#[test]
fn invalid_type_names_key() {
    let toml = r#"
[gateway]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "got: {errors:?}"
    );
}

/// Semantic problems surface as validation diagnostics after parsing succeeds.
#[test]
fn validation_errors_surface_from_str_loader() {
    let errors = load_and_validate_str("[poll]\ninterval_secs = 5\n").expect_err("too short");
    assert!(errors.iter().any(|e| matches!(e, ConfigError::Validation { .. })));
}

/// ConfigError implements miette::Diagnostic with a stable code.
#[test]
fn config_error_implements_diagnostic() {
    use miette::Diagnostic;

    let error = ConfigError::MissingKey {
        key: "sid".to_string(),
    };
    let code = error.code().expect("diagnostic code").to_string();
    assert_eq!(code, "ampwatch::config::missing_key");
}
