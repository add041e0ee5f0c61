// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading processor: raw portal payload to stored record.
//!
//! [`ReadingProcessor::process`] validates the payload, extracts the two
//! amounts, localizes the timestamp and computes deltas against the single
//! newest stored entry. [`ReadingProcessor::persist`] writes the record
//! unless it repeats that entry exactly.

use std::str::FromStr;
use std::sync::Arc;

use ampwatch_core::{
    AmpwatchError, CustomerInfo, LogStore, PersistOutcome, Reading, Record, SortOrder,
};
use ampwatch_portal::{PortalValue, ReadingResult};
use ampwatch_portal::types::STATE_OK;
use bigdecimal::{BigDecimal, Zero};
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use tracing::{debug, error, info};

/// Wall-time format the portal uses for `Time`.
pub const PORTAL_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

pub struct ReadingProcessor {
    store: Arc<dyn LogStore>,
    tz: TimeZone,
    record_identity: bool,
}

impl ReadingProcessor {
    /// `record_identity` controls whether customer id, address and name are kept.
    pub fn new(store: Arc<dyn LogStore>, tz: TimeZone, record_identity: bool) -> Self {
        Self {
            store,
            tz,
            record_identity,
        }
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Validates a payload and turns it into a reading. Touches no storage.
    pub fn parse(&self, raw: ReadingResult) -> Result<Reading, AmpwatchError> {
        if !raw.success || raw.state != STATE_OK {
            return Err(AmpwatchError::MalformedReading(format!(
                "portal reported failure (success={}, state={}): {}",
                raw.success,
                raw.state,
                raw.message.as_deref().unwrap_or("no message")
            )));
        }
        let data = raw.data.ok_or_else(|| {
            AmpwatchError::MalformedReading("reading payload carries no data".to_string())
        })?;

        let used_amp = amount("Usedamp", data.used_amp.as_ref())?;
        let res_amp = amount("Resamp", data.res_amp.as_ref())?;

        let raw_time = data
            .time
            .as_deref()
            .ok_or_else(|| AmpwatchError::MalformedReading("missing Time".to_string()))?;
        let record_time = DateTime::strptime(PORTAL_TIME_FORMAT, raw_time.trim())
            .and_then(|civil| civil.to_zoned(self.tz.clone()))
            .map_err(|e| AmpwatchError::MalformedReading(format!("bad Time `{raw_time}`: {e}")))?;

        let customer = self.record_identity.then(|| CustomerInfo {
            cust_id: data.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            addr: data.addr.clone().unwrap_or_default(),
            name: data.name.clone().unwrap_or_default(),
        });

        Ok(Reading {
            used_amp,
            res_amp,
            record_time,
            customer,
        })
    }

    /// Parses `raw` and annotates it with deltas against the newest stored entry.
    pub async fn process(&self, raw: ReadingResult) -> Result<Record, AmpwatchError> {
        let reading = self.parse(raw).inspect_err(|e| error!(error = %e, "rejected reading"))?;
        let previous = self
            .store
            .most_recent(1, SortOrder::Descending)
            .await?
            .into_iter()
            .next();
        let record = Record::compute(reading, previous.as_ref());
        debug!(
            used_amp = %record.used_amp(),
            res_amp = %record.res_amp(),
            prev_used_amp = %record.prev_used_amp(),
            prev_res_amp = %record.prev_res_amp(),
            previous_id = ?record.previous_id(),
            "reading processed"
        );
        Ok(record)
    }

    /// Stores `record` unless both deltas against an existing entry are zero.
    ///
    /// Failures are logged and returned; nothing is retried.
    pub async fn persist(&self, record: &Record) -> Result<PersistOutcome, AmpwatchError> {
        if record.is_unchanged_repeat() {
            info!(
                previous_id = ?record.previous_id(),
                "reading unchanged since last entry, skipping"
            );
            return Ok(PersistOutcome::SkippedDuplicate);
        }
        match self.store.insert(record).await {
            Ok(id) => {
                info!(id, used_amp = %record.used_amp(), res_amp = %record.res_amp(), "reading stored");
                Ok(PersistOutcome::Inserted(id))
            }
            Err(e) => {
                error!(error = %e, "failed to store reading");
                Err(match e {
                    AmpwatchError::Persist { .. } => e,
                    other => AmpwatchError::Persist {
                        source: Box::new(other),
                    },
                })
            }
        }
    }
}

fn amount(field: &str, value: Option<&PortalValue>) -> Result<BigDecimal, AmpwatchError> {
    let text = value
        .map(ToString::to_string)
        .ok_or_else(|| AmpwatchError::MalformedReading(format!("missing {field}")))?;
    let parsed = BigDecimal::from_str(&text)
        .map_err(|e| AmpwatchError::MalformedReading(format!("bad {field} `{text}`: {e}")))?;
    if parsed < BigDecimal::zero() {
        return Err(AmpwatchError::MalformedReading(format!(
            "negative {field} `{text}`"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ampwatch_core::{HealthStatus, LogEntry};
    use async_trait::async_trait;

    /// Store that must never be touched by `parse`.
    struct Unreachable;

    #[async_trait]
    impl LogStore for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }
        async fn insert(&self, _record: &Record) -> Result<i64, AmpwatchError> {
            unreachable!()
        }
        async fn most_recent(
            &self,
            _limit: usize,
            _order: SortOrder,
        ) -> Result<Vec<LogEntry>, AmpwatchError> {
            unreachable!()
        }
        async fn health_check(&self) -> Result<HealthStatus, AmpwatchError> {
            Ok(HealthStatus::Healthy)
        }
        async fn close(&self) -> Result<(), AmpwatchError> {
            Ok(())
        }
    }

    fn processor(record_identity: bool) -> ReadingProcessor {
        ReadingProcessor::new(
            Arc::new(Unreachable),
            TimeZone::get("Asia/Shanghai").unwrap(),
            record_identity,
        )
    }

    fn payload(json: serde_json::Value) -> ReadingResult {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parses_amounts_and_localizes_time() {
        let reading = processor(false)
            .parse(payload(serde_json::json!({
                "success": true, "state": 200,
                "data": {"Usedamp": "120.500000", "Resamp": 30.25, "Time": "2024/01/01 08:00:00",
                         "Id": 5678, "Addr": "A-101", "Name": "Block A"}
            })))
            .unwrap();
        assert_eq!(reading.used_amp, BigDecimal::from_str("120.5").unwrap());
        assert_eq!(reading.res_amp, BigDecimal::from_str("30.25").unwrap());
        assert_eq!(reading.record_time.hour(), 8);
        assert_eq!(reading.record_time.time_zone().iana_name(), Some("Asia/Shanghai"));
        assert!(reading.customer.is_none());
    }

    #[test]
    fn identity_fields_are_kept_when_enabled() {
        let reading = processor(true)
            .parse(payload(serde_json::json!({
                "success": true, "state": 200,
                "data": {"Usedamp": "1", "Resamp": "2", "Time": "2024/01/01 08:00:00",
                         "Id": 5678, "Addr": "A-101", "Name": "Block A"}
            })))
            .unwrap();
        let customer = reading.customer.unwrap();
        assert_eq!(customer.cust_id, "5678");
        assert_eq!(customer.addr, "A-101");
    }

    #[test]
    fn unsuccessful_payload_is_rejected() {
        let err = processor(false)
            .parse(payload(serde_json::json!({
                "success": false, "state": 200,
                "data": {"Usedamp": "1", "Resamp": "2", "Time": "2024/01/01 08:00:00"}
            })))
            .unwrap_err();
        assert!(matches!(err, AmpwatchError::MalformedReading(_)));

        let err = processor(false)
            .parse(payload(serde_json::json!({
                "success": true, "state": 500, "msg": "maintenance", "data": ""
            })))
            .unwrap_err();
        assert!(err.to_string().contains("maintenance"));
    }

    #[test]
    fn missing_or_bad_amounts_are_malformed() {
        let missing = processor(false).parse(payload(serde_json::json!({
            "success": true, "state": 200,
            "data": {"Resamp": "2", "Time": "2024/01/01 08:00:00"}
        })));
        assert!(missing.unwrap_err().to_string().contains("Usedamp"));

        let garbage = processor(false).parse(payload(serde_json::json!({
            "success": true, "state": 200,
            "data": {"Usedamp": "1", "Resamp": "n/a", "Time": "2024/01/01 08:00:00"}
        })));
        assert!(garbage.unwrap_err().to_string().contains("Resamp"));

        let negative = processor(false).parse(payload(serde_json::json!({
            "success": true, "state": 200,
            "data": {"Usedamp": "-1", "Resamp": "2", "Time": "2024/01/01 08:00:00"}
        })));
        assert!(negative.unwrap_err().to_string().contains("negative"));
    }

    #[test]
    fn bad_time_is_malformed() {
        let err = processor(false)
            .parse(payload(serde_json::json!({
                "success": true, "state": 200,
                "data": {"Usedamp": "1", "Resamp": "2", "Time": "2024-01-01T08:00:00"}
            })))
            .unwrap_err();
        assert!(matches!(err, AmpwatchError::MalformedReading(_)));
    }
}
