// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log table queries.

use ampwatch_core::{AmpwatchError, Record, SortOrder, format_fixed};
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::LogRow;

/// Appends a record and returns the assigned id.
pub async fn insert_log(db: &Database, record: &Record) -> Result<i64, AmpwatchError> {
    let used_amp = format_fixed(record.used_amp());
    let res_amp = format_fixed(record.res_amp());
    let difference = format_fixed(record.difference());
    let prev_used_amp = format_fixed(record.prev_used_amp());
    let prev_res_amp = format_fixed(record.prev_res_amp());
    let prev_ratio = format_fixed(record.prev_ratio());
    let record_time = record.record_time().timestamp().to_string();
    let customer = record.customer().cloned();

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO electricity_log
                    (used_amp, res_amp, difference, prev_used_amp, prev_res_amp, prev_ratio,
                     record_time, cust_id, addr, name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    used_amp,
                    res_amp,
                    difference,
                    prev_used_amp,
                    prev_res_amp,
                    prev_ratio,
                    record_time,
                    customer.as_ref().map(|c| c.cust_id.clone()),
                    customer.as_ref().map(|c| c.addr.clone()),
                    customer.as_ref().map(|c| c.name.clone()),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// The `limit` highest-id rows (all rows when `limit` is zero), in `order`.
pub async fn most_recent(
    db: &Database,
    limit: usize,
    order: SortOrder,
) -> Result<Vec<LogRow>, AmpwatchError> {
    // SQLite treats a negative LIMIT as no limit.
    let limit = if limit == 0 {
        -1
    } else {
        i64::try_from(limit).unwrap_or(i64::MAX)
    };

    let mut rows = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, used_amp, res_amp, prev_used_amp, prev_res_amp, prev_ratio,
                        record_time, cust_id, addr, name
                 FROM electricity_log ORDER BY id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    Ok(LogRow {
                        id: row.get(0)?,
                        used_amp: row.get(1)?,
                        res_amp: row.get(2)?,
                        prev_used_amp: row.get(3)?,
                        prev_res_amp: row.get(4)?,
                        prev_ratio: row.get(5)?,
                        record_time: row.get(6)?,
                        cust_id: row.get(7)?,
                        addr: row.get(8)?,
                        name: row.get(9)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)?;

    if order == SortOrder::Ascending {
        rows.reverse();
    }
    Ok(rows)
}

/// Total number of stored rows.
pub async fn count(db: &Database) -> Result<i64, AmpwatchError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM electricity_log", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}
