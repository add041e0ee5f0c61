// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the SQLite log store.

use std::str::FromStr;

use ampwatch_config::model::StorageConfig;
use ampwatch_core::{CustomerInfo, HealthStatus, LogStore, Reading, Record, SortOrder};
use ampwatch_storage::SqliteLogStore;
use bigdecimal::BigDecimal;
use jiff::tz::TimeZone;
use tempfile::{TempDir, tempdir};

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

fn shanghai() -> TimeZone {
    TimeZone::get("Asia/Shanghai").unwrap()
}

fn reading(used: &str, res: &str, time: &str) -> Reading {
    Reading {
        used_amp: dec(used),
        res_amp: dec(res),
        record_time: jiff::civil::DateTime::strptime("%Y/%m/%d %H:%M:%S", time)
            .unwrap()
            .to_zoned(shanghai())
            .unwrap(),
        customer: None,
    }
}

async fn open_store(tz: TimeZone) -> (TempDir, SqliteLogStore) {
    let dir = tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("log.db").to_string_lossy().into_owned(),
        wal_mode: true,
        max_retries: 1,
        retry_delay_secs: 0,
    };
    let store = SqliteLogStore::open(&config, tz).await.unwrap();
    (dir, store)
}

#[tokio::test]
async fn empty_store_has_no_latest() {
    let (_dir, store) = open_store(shanghai()).await;
    assert!(store.latest().await.unwrap().is_none());
    assert!(store.most_recent(0, SortOrder::Ascending).await.unwrap().is_empty());
}

#[tokio::test]
async fn ids_increase_and_latest_is_highest_id() {
    let (_dir, store) = open_store(shanghai()).await;

    // The second reading carries an earlier timestamp; recency is by id only.
    let first = Record::compute(reading("10", "5", "2024/01/01 09:00:00"), None);
    let id1 = store.insert(&first).await.unwrap();
    let second = Record::compute(reading("11", "4", "2024/01/01 08:00:00"), None);
    let id2 = store.insert(&second).await.unwrap();
    assert!(id2 > id1);

    let latest = store.latest().await.unwrap().unwrap();
    assert_eq!(latest.id, id2);
    assert_eq!(latest.record.used_amp(), &dec("11"));
}

#[tokio::test]
async fn most_recent_respects_limit_and_order() {
    let (_dir, store) = open_store(shanghai()).await;
    for used in ["1", "2", "3", "4"] {
        let record = Record::compute(reading(used, "0", "2024/01/01 08:00:00"), None);
        store.insert(&record).await.unwrap();
    }

    let newest_two = store.most_recent(2, SortOrder::Descending).await.unwrap();
    let used: Vec<_> = newest_two.iter().map(|e| e.record.used_amp().to_string()).collect();
    assert_eq!(used, ["4.000000", "3.000000"]);

    let ascending = store.most_recent(2, SortOrder::Ascending).await.unwrap();
    assert_eq!(ascending[0].record.used_amp(), &dec("3"));
    assert_eq!(ascending[1].record.used_amp(), &dec("4"));

    let all = store.most_recent(0, SortOrder::Ascending).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn amounts_and_deltas_survive_round_trip_exactly() {
    let (_dir, store) = open_store(shanghai()).await;
    let first = Record::compute(reading("120.500000", "30.250000", "2024/01/01 08:00:00"), None);
    store.insert(&first).await.unwrap();
    let previous = store.latest().await.unwrap().unwrap();

    let second = Record::compute(
        reading("125.750000", "28.000000", "2024/01/01 08:10:00"),
        Some(&previous),
    );
    store.insert(&second).await.unwrap();

    let stored = store.latest().await.unwrap().unwrap();
    assert_eq!(stored.record.used_amp(), second.used_amp());
    assert_eq!(stored.record.difference(), &dec("97.75"));
    assert_eq!(stored.record.prev_used_amp(), &dec("5.25"));
    assert_eq!(stored.record.prev_res_amp(), &dec("-2.25"));
    assert_eq!(stored.record.prev_ratio(), &dec("2.333333"));
    assert_eq!(stored.record.record_time(), second.record_time());
}

#[tokio::test]
async fn zero_deltas_keep_fixed_scale_in_columns_and_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.db").to_string_lossy().into_owned();
    let config = StorageConfig {
        database_path: path.clone(),
        wal_mode: false,
        max_retries: 1,
        retry_delay_secs: 0,
    };
    let store = SqliteLogStore::open(&config, shanghai()).await.unwrap();
    let first = Record::compute(reading("120.5", "30.25", "2024/01/01 08:00:00"), None);
    store.insert(&first).await.unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let columns: (String, String, String, String) = conn
        .query_row(
            "SELECT used_amp, prev_used_amp, prev_res_amp, prev_ratio FROM electricity_log",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(
        columns,
        (
            "120.500000".to_string(),
            "0.000000".to_string(),
            "0.000000".to_string(),
            "0.000000".to_string()
        )
    );

    let stored = store.latest().await.unwrap().unwrap();
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["prev_used_amp"], "0.000000");
    assert_eq!(json["prev_res_amp"], "0.000000");
    assert_eq!(json["prev_ratio"], "0.000000");
    assert_eq!(json["difference"], "90.250000");
}

#[tokio::test]
async fn record_time_is_presented_in_configured_zone() {
    let (_dir, store) = open_store(TimeZone::UTC).await;
    let record = Record::compute(reading("1", "1", "2024/01/01 08:00:00"), None);
    store.insert(&record).await.unwrap();

    let stored = store.latest().await.unwrap().unwrap();
    assert_eq!(stored.record.record_time().hour(), 0);
    assert_eq!(
        stored.record.record_time().timestamp(),
        record.record_time().timestamp()
    );
}

#[tokio::test]
async fn customer_fields_are_stored_when_present() {
    let (_dir, store) = open_store(shanghai()).await;
    let mut with_customer = reading("1", "1", "2024/01/01 08:00:00");
    with_customer.customer = Some(CustomerInfo {
        cust_id: "5678".into(),
        addr: "A-101".into(),
        name: "Block A".into(),
    });
    store
        .insert(&Record::compute(with_customer, None))
        .await
        .unwrap();

    let stored = store.latest().await.unwrap().unwrap();
    assert_eq!(stored.record.customer().unwrap().addr, "A-101");
}

#[tokio::test]
async fn health_and_close() {
    let (_dir, store) = open_store(shanghai()).await;
    assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    assert_eq!(store.name(), "sqlite");
    store.close().await.unwrap();
}
