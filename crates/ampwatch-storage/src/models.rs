// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row model for the `electricity_log` table.

use std::str::FromStr;

use ampwatch_core::{AmpwatchError, CustomerInfo, LogEntry, Record};
use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::tz::TimeZone;

/// A raw `electricity_log` row, columns as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub id: i64,
    pub used_amp: String,
    pub res_amp: String,
    pub prev_used_amp: String,
    pub prev_res_amp: String,
    pub prev_ratio: String,
    pub record_time: String,
    pub cust_id: Option<String>,
    pub addr: Option<String>,
    pub name: Option<String>,
}

impl LogRow {
    /// Decodes the row, presenting `record_time` in `tz`.
    ///
    /// The stored `difference` column is not read back; it is recomputed.
    pub fn into_entry(self, tz: &TimeZone) -> Result<LogEntry, AmpwatchError> {
        let instant: Timestamp = self.record_time.parse().map_err(|e| {
            AmpwatchError::persist(format!(
                "row {}: bad record_time `{}`: {e}",
                self.id, self.record_time
            ))
        })?;
        let customer = self.cust_id.map(|cust_id| CustomerInfo {
            cust_id,
            addr: self.addr.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        });

        let record = Record::restore(
            decimal(self.id, "used_amp", &self.used_amp)?,
            decimal(self.id, "res_amp", &self.res_amp)?,
            decimal(self.id, "prev_used_amp", &self.prev_used_amp)?,
            decimal(self.id, "prev_res_amp", &self.prev_res_amp)?,
            decimal(self.id, "prev_ratio", &self.prev_ratio)?,
            instant.to_zoned(tz.clone()),
            customer,
        );
        Ok(LogEntry {
            id: self.id,
            record,
        })
    }
}

fn decimal(id: i64, column: &str, raw: &str) -> Result<BigDecimal, AmpwatchError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AmpwatchError::persist(format!("row {id}: bad {column} `{raw}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> LogRow {
        LogRow {
            id: 3,
            used_amp: "125.750000".into(),
            res_amp: "28.000000".into(),
            prev_used_amp: "5.250000".into(),
            prev_res_amp: "-2.250000".into(),
            prev_ratio: "2.333333".into(),
            record_time: "2024-01-01T00:10:00Z".into(),
            cust_id: None,
            addr: None,
            name: None,
        }
    }

    #[test]
    fn row_decodes_into_entry_in_zone() {
        let tz = TimeZone::get("Asia/Shanghai").unwrap();
        let entry = row().into_entry(&tz).unwrap();
        assert_eq!(entry.id, 3);
        assert_eq!(entry.record.difference(), &BigDecimal::from_str("97.75").unwrap());
        assert_eq!(entry.record.record_time().hour(), 8);
        assert!(entry.record.customer().is_none());
    }

    #[test]
    fn bad_decimal_is_persist_error() {
        let mut bad = row();
        bad.res_amp = "lots".into();
        let err = bad.into_entry(&TimeZone::UTC).unwrap_err();
        assert!(matches!(err, AmpwatchError::Persist { .. }));
        assert!(err.to_string().contains("res_amp"));
    }

    #[test]
    fn customer_columns_become_customer_info() {
        let mut with_customer = row();
        with_customer.cust_id = Some("5678".into());
        with_customer.name = Some("Block A".into());
        let entry = with_customer.into_entry(&TimeZone::UTC).unwrap();
        let customer = entry.record.customer().unwrap();
        assert_eq!(customer.cust_id, "5678");
        assert_eq!(customer.addr, "");
        assert_eq!(customer.name, "Block A");
    }
}
