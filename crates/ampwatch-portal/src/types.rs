// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed portal payloads.
//!
//! The portal is loose about types: ids and amounts arrive as strings or as
//! numbers, and `data` may be an empty string on failure. Fields are
//! therefore optional and [`PortalValue`] accepts either representation.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Application status the portal uses for success.
pub const STATE_OK: i64 = 200;

/// A scalar that may be encoded as a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortalValue {
    Text(String),
    Number(serde_json::Number),
}

impl std::fmt::Display for PortalValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s.trim()),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Answer to `POST interface/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub state: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<LoginData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub studentid: PortalValue,
    pub token: String,
}

/// Envelope of every `POST interface/index` method call.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub state: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(
        default = "none",
        deserialize_with = "lenient",
        bound(deserialize = "T: DeserializeOwned")
    )]
    pub data: Option<T>,
}

impl<T> IndexResponse<T> {
    /// True when both the success flag and the application status say so.
    pub fn is_ok(&self) -> bool {
        self.success && self.state == STATE_OK
    }
}

/// Dormitory meter fields of a `geteldorbaseinfo` answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadingData {
    #[serde(rename = "Usedamp", default)]
    pub used_amp: Option<PortalValue>,
    #[serde(rename = "Resamp", default)]
    pub res_amp: Option<PortalValue>,
    /// Portal-local wall time, `YYYY/MM/DD hh:mm:ss`.
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Id", default)]
    pub id: Option<PortalValue>,
    #[serde(rename = "Addr", default)]
    pub addr: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

pub type ReadingResult = IndexResponse<ReadingData>;

/// One dormitory bound to the student, from `getelstudorbandinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingInfo {
    #[serde(rename = "CustId")]
    pub cust_id: PortalValue,
}

fn none<T>() -> Option<T> {
    None
}

/// Decodes `data` when it has the expected shape and yields `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
