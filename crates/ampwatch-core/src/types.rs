// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readings, records and the small enums shared across the workspace.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use jiff::Zoned;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

/// Number of fractional digits every stored amount carries.
pub const DECIMAL_SCALE: i64 = 6;

/// Rounds a decimal to [`DECIMAL_SCALE`] digits, half away from zero.
pub fn quantize(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(DECIMAL_SCALE, RoundingMode::HalfUp)
}

/// Renders a decimal with exactly [`DECIMAL_SCALE`] fractional digits.
///
/// `BigDecimal`'s `Display` drops the scale of a zero (`0` rather than
/// `0.000000`), so every outward rendering goes through here instead.
pub fn format_fixed(value: &BigDecimal) -> String {
    let (digits, _) = quantize(value).into_bigint_and_exponent();
    let text = digits.to_string();
    let (sign, magnitude) = match text.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", text.as_str()),
    };
    let scale = DECIMAL_SCALE as usize;
    let padded = format!("{magnitude:0>width$}", width = scale + 1);
    let (whole, fraction) = padded.split_at(padded.len() - scale);
    format!("{sign}{whole}.{fraction}")
}

fn serialize_fixed<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_fixed(value))
}

/// Used delta divided by the magnitude of the remaining delta.
///
/// Zero whenever either delta is zero, so the division is never undefined.
pub fn delta_ratio(used_delta: &BigDecimal, res_delta: &BigDecimal) -> BigDecimal {
    if used_delta.is_zero() || res_delta.is_zero() {
        return quantize(&BigDecimal::zero());
    }
    quantize(&(used_delta / res_delta.abs()))
}

/// Customer fields the portal returns alongside a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub cust_id: String,
    pub addr: String,
    pub name: String,
}

/// A validated meter reading, not yet compared against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub used_amp: BigDecimal,
    pub res_amp: BigDecimal,
    pub record_time: Zoned,
    pub customer: Option<CustomerInfo>,
}

/// A reading annotated with its deltas against the previously stored record.
///
/// Fields are read-only so `difference` can never drift from
/// `used_amp - res_amp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(serialize_with = "serialize_fixed")]
    used_amp: BigDecimal,
    #[serde(serialize_with = "serialize_fixed")]
    res_amp: BigDecimal,
    #[serde(serialize_with = "serialize_fixed")]
    difference: BigDecimal,
    #[serde(serialize_with = "serialize_fixed")]
    prev_used_amp: BigDecimal,
    #[serde(serialize_with = "serialize_fixed")]
    prev_res_amp: BigDecimal,
    #[serde(serialize_with = "serialize_fixed")]
    prev_ratio: BigDecimal,
    #[serde(rename = "time")]
    record_time: Zoned,
    #[serde(flatten)]
    customer: Option<CustomerInfo>,
    /// Store id of the entry the deltas were computed against.
    #[serde(skip)]
    previous_id: Option<i64>,
}

impl Record {
    /// Builds a record from a fresh reading and the latest stored entry, if any.
    pub fn compute(reading: Reading, previous: Option<&LogEntry>) -> Self {
        let used_amp = quantize(&reading.used_amp);
        let res_amp = quantize(&reading.res_amp);
        let (prev_used_amp, prev_res_amp, previous_id) = match previous {
            Some(entry) => (
                &used_amp - &entry.record.used_amp,
                &res_amp - &entry.record.res_amp,
                Some(entry.id),
            ),
            None => (BigDecimal::zero(), BigDecimal::zero(), None),
        };
        let prev_ratio = delta_ratio(&prev_used_amp, &prev_res_amp);

        Self {
            difference: quantize(&(&used_amp - &res_amp)),
            used_amp,
            res_amp,
            prev_used_amp: quantize(&prev_used_amp),
            prev_res_amp: quantize(&prev_res_amp),
            prev_ratio,
            record_time: reading.record_time,
            customer: reading.customer,
            previous_id,
        }
    }

    /// Rebuilds a record loaded from a store row. `difference` is recomputed.
    pub fn restore(
        used_amp: BigDecimal,
        res_amp: BigDecimal,
        prev_used_amp: BigDecimal,
        prev_res_amp: BigDecimal,
        prev_ratio: BigDecimal,
        record_time: Zoned,
        customer: Option<CustomerInfo>,
    ) -> Self {
        Self {
            difference: quantize(&(&used_amp - &res_amp)),
            used_amp: quantize(&used_amp),
            res_amp: quantize(&res_amp),
            prev_used_amp: quantize(&prev_used_amp),
            prev_res_amp: quantize(&prev_res_amp),
            prev_ratio: quantize(&prev_ratio),
            record_time,
            customer,
            previous_id: None,
        }
    }

    pub fn used_amp(&self) -> &BigDecimal {
        &self.used_amp
    }

    pub fn res_amp(&self) -> &BigDecimal {
        &self.res_amp
    }

    pub fn difference(&self) -> &BigDecimal {
        &self.difference
    }

    pub fn prev_used_amp(&self) -> &BigDecimal {
        &self.prev_used_amp
    }

    pub fn prev_res_amp(&self) -> &BigDecimal {
        &self.prev_res_amp
    }

    pub fn prev_ratio(&self) -> &BigDecimal {
        &self.prev_ratio
    }

    pub fn record_time(&self) -> &Zoned {
        &self.record_time
    }

    pub fn customer(&self) -> Option<&CustomerInfo> {
        self.customer.as_ref()
    }

    pub fn previous_id(&self) -> Option<i64> {
        self.previous_id
    }

    /// True when a previous record exists and neither amount moved since it.
    pub fn is_unchanged_repeat(&self) -> bool {
        self.previous_id.is_some() && self.prev_used_amp.is_zero() && self.prev_res_amp.is_zero()
    }
}

/// A record as held by a log store, with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub record: Record,
}

/// Result of handing a record to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PersistOutcome {
    /// Written under the given store id.
    #[strum(to_string = "inserted")]
    Inserted(i64),
    /// Identical to the latest stored record; nothing written.
    #[strum(to_string = "skipped_duplicate")]
    SkippedDuplicate,
}

impl PersistOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Order in which stored entries are returned.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}
