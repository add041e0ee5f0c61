// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ampwatch.toml` > `~/.config/ampwatch/ampwatch.toml` >
//! `/etc/ampwatch/ampwatch.toml`, with environment variable overrides via the
//! `AMPWATCH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AmpwatchConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ampwatch/ampwatch.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "ampwatch.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ampwatch/ampwatch.toml`
/// 3. `~/.config/ampwatch/ampwatch.toml`
/// 4. `./ampwatch.toml`
/// 5. `AMPWATCH_*` environment variables
pub fn load_config() -> Result<AmpwatchConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<AmpwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AmpwatchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AmpwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AmpwatchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(AmpwatchConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `$XDG_CONFIG_HOME/ampwatch/ampwatch.toml`, when a config dir exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("ampwatch").join(LOCAL_CONFIG_FILE))
}

/// Environment provider mapping `AMPWATCH_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys themselves
/// contain underscores: `AMPWATCH_PORTAL_BASE_URL` is `portal.base_url`.
fn env_provider() -> Env {
    Env::prefixed("AMPWATCH_").map(|key| env_key_path(key.as_str()).into())
}

const SECTIONS: &[&str] = &["portal", "poll", "storage", "gateway", "logging"];

/// `GATEWAY_ACCESS_TOKEN` becomes `gateway.access_token`.
///
/// Env keys arrive in their original case. Only a leading section name is
/// rewritten; anything else is left for `deny_unknown_fields` to reject.
fn env_key_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or(key)
}
