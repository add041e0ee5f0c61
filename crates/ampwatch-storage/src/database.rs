// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode and
//! connect-with-retry.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use ampwatch_config::model::StorageConfig;
use ampwatch_core::AmpwatchError;
use tracing::{debug, error, info, warn};

use crate::migrations::run_migrations;

/// Convert a tokio-rusqlite error into [`AmpwatchError::Persist`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> AmpwatchError {
    AmpwatchError::Persist {
        source: Box::new(e),
    }
}

/// Handle to the open, migrated log database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) and migrates the database at `path`.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, AmpwatchError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AmpwatchError::Persist {
                    source: Box::new(e),
                })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| AmpwatchError::Persist {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch("PRAGMA busy_timeout = 5000; PRAGMA synchronous = NORMAL;")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(|e| AmpwatchError::persist(format!("database migration failed: {e}")))?;

        debug!(path, wal_mode, "database opened and migrated");
        Ok(Self { conn })
    }

    /// Opens the configured database, retrying with a fixed delay.
    ///
    /// After `max_retries` failed attempts the last failure is wrapped in
    /// [`AmpwatchError::StorageUnavailable`].
    pub async fn open_with_retry(config: &StorageConfig) -> Result<Self, AmpwatchError> {
        let attempts = config.max_retries.max(1);
        let delay = Duration::from_secs(config.retry_delay_secs);
        let mut attempt = 1;

        loop {
            match Self::open(&config.database_path, config.wal_mode).await {
                Ok(db) => {
                    info!(path = %config.database_path, attempt, "log store ready");
                    return Ok(db);
                }
                Err(e) if attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "opening log store failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempts, error = %e, "giving up on log store");
                    return Err(AmpwatchError::StorageUnavailable {
                        attempts,
                        source: Box::new(e),
                    });
                }
            }
        }
    }

    /// The shared tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config(path: &str, max_retries: u32) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
            max_retries,
            retry_delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("log.db");
        Database::open(path.to_str().unwrap(), true).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wal.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn exhausted_retries_report_storage_unavailable() {
        let dir = tempdir().unwrap();
        // A regular file where a directory is needed makes every attempt fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let path = blocker.join("log.db");

        let err = Database::open_with_retry(&config(path.to_str().unwrap(), 2))
            .await
            .err()
            .expect("open should fail");
        match err {
            AmpwatchError::StorageUnavailable { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected StorageUnavailable, got {other}"),
        }
    }

    #[tokio::test]
    async fn open_with_retry_succeeds_first_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ok.db");
        assert!(
            Database::open_with_retry(&config(path.to_str().unwrap(), 3))
                .await
                .is_ok()
        );
    }
}
