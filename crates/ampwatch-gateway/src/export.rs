// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV rendering of stored log entries.

use std::collections::BTreeSet;

use ampwatch_core::{AmpwatchError, LogEntry};
use jiff::Zoned;
use serde_json::{Map, Value};

/// Wall-clock format of the `time` column.
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIME_COLUMN: &str = "time";

/// Attachment name for an export taken at `now`.
pub fn export_filename(now: &Zoned) -> String {
    format!("logs_{}.csv", now.strftime("%Y-%m-%d_%H-%M-%S"))
}

/// Renders `entries` as CSV, one row each, in the given order.
///
/// Columns are `time` followed by every other field present in any row,
/// alphabetically. No entries renders as an empty string.
pub fn entries_to_csv(entries: &[LogEntry]) -> Result<String, AmpwatchError> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut row = match serde_json::to_value(entry).map_err(internal)? {
            Value::Object(map) => map,
            other => {
                return Err(AmpwatchError::Internal(format!(
                    "log entry serialized as {other}"
                )));
            }
        };
        row.insert(
            TIME_COLUMN.to_string(),
            Value::String(entry.record.record_time().strftime(CSV_TIME_FORMAT).to_string()),
        );
        rows.push(row);
    }

    let others: BTreeSet<&str> = rows
        .iter()
        .flat_map(Map::keys)
        .map(String::as_str)
        .filter(|key| *key != TIME_COLUMN)
        .collect();
    let columns: Vec<&str> = std::iter::once(TIME_COLUMN).chain(others).collect();

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&columns).map_err(internal)?;
    for row in &rows {
        writer
            .write_record(columns.iter().map(|column| cell(row.get(*column))))
            .map_err(internal)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AmpwatchError::Internal(format!("csv flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(internal)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn internal(e: impl std::fmt::Display) -> AmpwatchError {
    AmpwatchError::Internal(format!("csv export failed: {e}"))
}
