// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks what serde attributes cannot express: URL shape, known timezone
//! names, sane intervals and retry counts.

use crate::diagnostic::ConfigError;
use crate::model::AmpwatchConfig;

/// Shortest allowed polling interval. The scheduler truncates to the minute.
pub const MIN_INTERVAL_SECS: u64 = 60;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration, collecting every problem found.
pub fn validate_config(config: &AmpwatchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match reqwest::Url::parse(config.portal.base_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ConfigError::validation(format!(
            "portal.base_url must use http or https, got `{}`",
            url.scheme()
        ))),
        Err(e) => errors.push(ConfigError::validation(format!(
            "portal.base_url `{}` is not a valid URL: {e}",
            config.portal.base_url
        ))),
    }

    if config.portal.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "portal.request_timeout_secs must be at least 1",
        ));
    }

    if let Some(cust_id) = &config.portal.cust_id
        && cust_id.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "portal.cust_id must not be empty when set; remove it to look it up",
        ));
    }

    if config.poll.interval_secs < MIN_INTERVAL_SECS {
        errors.push(ConfigError::validation(format!(
            "poll.interval_secs must be at least {MIN_INTERVAL_SECS}, got {}",
            config.poll.interval_secs
        )));
    }

    if let Err(e) = config.poll.time_zone() {
        errors.push(ConfigError::validation(format!("poll.timezone: {e}")));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.storage.max_retries < 1 {
        errors.push(ConfigError::validation(
            "storage.max_retries must be at least 1",
        ));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }

    if let Some(token) = &config.gateway.access_token
        && token.is_empty()
    {
        errors.push(ConfigError::validation(
            "gateway.access_token must not be empty when set",
        ));
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.logging.level
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&AmpwatchConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = AmpwatchConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn short_interval_fails_validation() {
        let mut config = AmpwatchConfig::default();
        config.poll.interval_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "interval_secs"));
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let mut config = AmpwatchConfig::default();
        config.portal.base_url = "ftp://portal.example".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "http or https"));
    }

    #[test]
    fn unknown_timezone_fails_validation() {
        let mut config = AmpwatchConfig::default();
        config.poll.timezone = "Atlantis/Central".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "poll.timezone"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = AmpwatchConfig::default();
        config.storage.max_retries = 0;
        config.gateway.access_token = Some(String::new());
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
