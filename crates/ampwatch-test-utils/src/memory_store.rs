// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory log store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use ampwatch_core::{AmpwatchError, HealthStatus, LogEntry, LogStore, Record, SortOrder};

/// A [`LogStore`] backed by a `Vec`, with switchable insert failures.
#[derive(Default)]
pub struct MemoryLogStore {
    entries: Mutex<Vec<LogEntry>>,
    fail_inserts: AtomicBool,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following insert fail with a persist error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, record: &Record) -> Result<i64, AmpwatchError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AmpwatchError::persist("insert refused by test store"));
        }
        let mut entries = self.entries.lock().await;
        let id = entries.last().map_or(1, |last| last.id + 1);
        entries.push(LogEntry {
            id,
            record: record.clone(),
        });
        Ok(id)
    }

    async fn most_recent(
        &self,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<LogEntry>, AmpwatchError> {
        let entries = self.entries.lock().await;
        let take = if limit == 0 { entries.len() } else { limit };
        let mut newest: Vec<LogEntry> = entries.iter().rev().take(take).cloned().collect();
        if order == SortOrder::Ascending {
            newest.reverse();
        }
        Ok(newest)
    }

    async fn health_check(&self) -> Result<HealthStatus, AmpwatchError> {
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), AmpwatchError> {
        Ok(())
    }
}
