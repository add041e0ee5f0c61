// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log store trait for append-only record persistence.

use async_trait::async_trait;

use crate::error::AmpwatchError;
use crate::types::{HealthStatus, LogEntry, Record, SortOrder};

/// Append-only persistence for records.
///
/// Ids are assigned by the store and grow monotonically with insertion order.
/// "Most recent" always means highest id, never latest `record_time`.
#[async_trait]
pub trait LogStore: Send + Sync + 'static {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Appends a record and returns its store-assigned id.
    async fn insert(&self, record: &Record) -> Result<i64, AmpwatchError>;

    /// Returns up to `limit` of the newest entries in the requested order.
    ///
    /// A `limit` of zero returns every entry.
    async fn most_recent(
        &self,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<LogEntry>, AmpwatchError>;

    /// Reports whether the backend can serve requests.
    async fn health_check(&self) -> Result<HealthStatus, AmpwatchError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), AmpwatchError>;

    /// The single newest entry, if any.
    async fn latest(&self) -> Result<Option<LogEntry>, AmpwatchError> {
        Ok(self
            .most_recent(1, SortOrder::Descending)
            .await?
            .into_iter()
            .next())
    }
}
