// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a scripted reading source, a log store (temp
//! SQLite or in-memory) and a [`Poller`] over them.

use std::sync::Arc;

use ampwatch_config::model::StorageConfig;
use ampwatch_core::{AmpwatchError, LogStore};
use ampwatch_poller::{Poller, ReadingProcessor};
use ampwatch_storage::SqliteLogStore;
use jiff::tz::TimeZone;

use crate::memory_store::MemoryLogStore;
use crate::mock_source::MockReadingSource;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    cust_id: Option<String>,
    record_identity: bool,
    sqlite: bool,
    timezone: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            cust_id: Some("5678".to_string()),
            record_identity: false,
            sqlite: false,
            timezone: "Asia/Shanghai".to_string(),
        }
    }

    /// Configured customer id; `None` makes the poller resolve it.
    pub fn with_cust_id(mut self, cust_id: Option<&str>) -> Self {
        self.cust_id = cust_id.map(str::to_string);
        self
    }

    pub fn with_record_identity(mut self, record_identity: bool) -> Self {
        self.record_identity = record_identity;
        self
    }

    /// Use a SQLite store in a temp directory instead of the in-memory one.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    /// Build the harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, AmpwatchError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| AmpwatchError::Persist {
            source: Box::new(e),
        })?;
        let tz = TimeZone::get(&self.timezone)
            .map_err(|e| AmpwatchError::Config(format!("unknown timezone: {e}")))?;

        let memory = Arc::new(MemoryLogStore::new());
        let store: Arc<dyn LogStore> = if self.sqlite {
            let config = StorageConfig {
                database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
                wal_mode: true,
                max_retries: 1,
                retry_delay_secs: 0,
            };
            Arc::new(SqliteLogStore::open(&config, tz.clone()).await?)
        } else {
            memory.clone()
        };

        let source = Arc::new(MockReadingSource::new());
        let processor = ReadingProcessor::new(store.clone(), tz, self.record_identity);
        let poller = Arc::new(Poller::new(source.clone(), processor, self.cust_id));

        Ok(TestHarness {
            source,
            store,
            memory,
            poller,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete polling pipeline over fakes.
pub struct TestHarness {
    /// Scripted reading source feeding the poller.
    pub source: Arc<MockReadingSource>,
    /// The store the poller writes to.
    pub store: Arc<dyn LogStore>,
    /// The in-memory store; only wired in when SQLite was not requested.
    pub memory: Arc<MemoryLogStore>,
    pub poller: Arc<Poller>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with defaults: in-memory store, customer `5678`, Asia/Shanghai.
    pub async fn new() -> Result<Self, AmpwatchError> {
        Self::builder().build().await
    }
}
