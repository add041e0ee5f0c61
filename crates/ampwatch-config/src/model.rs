// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Ampwatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AmpwatchConfig {
    /// Remote portal address and student credentials.
    #[serde(default)]
    pub portal: PortalConfig,

    /// Polling interval and reading interpretation.
    #[serde(default)]
    pub poll: PollConfig,

    /// Log store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP endpoint settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote portal configuration.
///
/// The password is kept in plain text; protecting it at rest is left to the
/// deployment.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Portal root, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Student id or id card number used to log in.
    #[serde(default)]
    pub sid: String,

    /// Portal login password.
    #[serde(default)]
    pub password: String,

    /// Dormitory customer id. Looked up through the portal when unset.
    #[serde(default)]
    pub cust_id: Option<String>,

    /// User-Agent header sent with every portal request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout for portal calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("base_url", &self.base_url)
            .field("sid", &self.sid)
            .field("password", &"[redacted]")
            .field("cust_id", &self.cust_id)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sid: String::new(),
            password: String::new(),
            cust_id: None,
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://cw.gxjzy.com:8081".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/119.0.0.0 Safari/537.36"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollConfig {
    /// Run the scheduled poller. The on-demand endpoint works either way.
    #[serde(default = "default_poll_enabled")]
    pub enabled: bool,

    /// Seconds between the start of one cycle and the next.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// IANA zone the portal's wall-clock timestamps are interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Keep the customer id, address and name returned with each reading.
    #[serde(default)]
    pub record_identity: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            enabled: default_poll_enabled(),
            interval_secs: default_interval_secs(),
            timezone: default_timezone(),
            record_identity: false,
        }
    }
}

fn default_poll_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    600
}

fn default_timezone() -> String {
    "Asia/Shanghai".to_string()
}

/// Log store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Attempts made to open the database before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed pause between open attempts, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ampwatch").join("ampwatch.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ampwatch.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

/// HTTP endpoint configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Serve the HTTP endpoints.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Token required on authenticated endpoints.
    ///
    /// When unset every endpoint is open to anyone who can reach the port.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_host(),
            port: default_port(),
            access_token: None,
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl PollConfig {
    /// Resolves the configured zone name.
    pub fn time_zone(&self) -> Result<jiff::tz::TimeZone, ampwatch_core::AmpwatchError> {
        jiff::tz::TimeZone::get(&self.timezone).map_err(|e| {
            ampwatch_core::AmpwatchError::Config(format!(
                "unknown timezone `{}`: {e}",
                self.timezone
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_debug_redacts_password() {
        let config = PortalConfig {
            password: "hunter2".into(),
            ..PortalConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn gateway_debug_redacts_token() {
        let config = GatewayConfig {
            access_token: Some("tok-123".into()),
            ..GatewayConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("tok-123"));
    }

    #[test]
    fn default_timezone_resolves() {
        let tz = PollConfig::default().time_zone().unwrap();
        assert_eq!(tz.iana_name(), Some("Asia/Shanghai"));
    }

    #[test]
    fn unknown_timezone_is_config_error() {
        let config = PollConfig {
            timezone: "Mars/Olympus".into(),
            ..PollConfig::default()
        };
        let err = config.time_zone().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
