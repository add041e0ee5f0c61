// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`LogStore`] trait.

use async_trait::async_trait;
use jiff::tz::TimeZone;
use tracing::debug;

use ampwatch_config::model::StorageConfig;
use ampwatch_core::{AmpwatchError, HealthStatus, LogEntry, LogStore, Record, SortOrder};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed log store.
///
/// Record times are stored as UTC instants and handed back in `tz`.
pub struct SqliteLogStore {
    db: Database,
    tz: TimeZone,
}

impl SqliteLogStore {
    /// Opens the configured database with retries and runs migrations.
    pub async fn open(config: &StorageConfig, tz: TimeZone) -> Result<Self, AmpwatchError> {
        let db = Database::open_with_retry(config).await?;
        Ok(Self::new(db, tz))
    }

    pub fn new(db: Database, tz: TimeZone) -> Self {
        Self { db, tz }
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<i64, AmpwatchError> {
        queries::count(&self.db).await
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn insert(&self, record: &Record) -> Result<i64, AmpwatchError> {
        let id = queries::insert_log(&self.db, record).await?;
        debug!(id, "log entry inserted");
        Ok(id)
    }

    async fn most_recent(
        &self,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<LogEntry>, AmpwatchError> {
        queries::most_recent(&self.db, limit, order)
            .await?
            .into_iter()
            .map(|row| row.into_entry(&self.tz))
            .collect()
    }

    async fn health_check(&self) -> Result<HealthStatus, AmpwatchError> {
        let probe = self
            .db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await;
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn close(&self) -> Result<(), AmpwatchError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
