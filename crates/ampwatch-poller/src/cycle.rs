// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One fetch, process and persist cycle.
//!
//! Both the scheduler and on-demand callers go through [`Poller`], whose
//! cycle mutex keeps "read newest entry, then insert" single-writer.

use std::sync::Arc;

use ampwatch_core::{AmpwatchError, PersistOutcome, Record};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::processor::ReadingProcessor;
use crate::source::ReadingSource;

/// What a cycle produced.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    #[serde(flatten)]
    pub record: Record,
    /// `None` when the record was only previewed.
    #[serde(skip)]
    pub persisted: Option<PersistOutcome>,
}

impl CycleOutcome {
    pub fn is_inserted(&self) -> bool {
        self.persisted.is_some_and(|outcome| outcome.is_inserted())
    }
}

pub struct Poller {
    source: Arc<dyn ReadingSource>,
    processor: ReadingProcessor,
    cust_id: Option<String>,
    cycle: Mutex<()>,
}

impl Poller {
    /// `cust_id` is the configured dormitory; `None` resolves it through the portal.
    pub fn new(
        source: Arc<dyn ReadingSource>,
        processor: ReadingProcessor,
        cust_id: Option<String>,
    ) -> Self {
        Self {
            source,
            processor,
            cust_id,
            cycle: Mutex::new(()),
        }
    }

    pub fn processor(&self) -> &ReadingProcessor {
        &self.processor
    }

    pub fn cust_id(&self) -> Option<&str> {
        self.cust_id.as_deref()
    }

    /// Fetches, processes and persists a reading for the configured dormitory.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, AmpwatchError> {
        self.fetch_on_demand(None).await
    }

    /// Runs a cycle for `cust_id`.
    ///
    /// A customer id other than the configured one is a preview: the record
    /// is computed against the store but never written.
    pub async fn fetch_on_demand(
        &self,
        cust_id: Option<&str>,
    ) -> Result<CycleOutcome, AmpwatchError> {
        let preview = cust_id.is_some_and(|requested| Some(requested) != self.cust_id.as_deref());
        let target = cust_id.or(self.cust_id.as_deref());

        let _guard = self.cycle.lock().await;
        let raw = self.source.fetch_reading(target).await?;
        let record = self.processor.process(raw).await?;

        if preview {
            info!(cust_id = ?target, "previewed reading for another customer, not stored");
            return Ok(CycleOutcome {
                record,
                persisted: None,
            });
        }

        let outcome = self.processor.persist(&record).await?;
        Ok(CycleOutcome {
            record,
            persisted: Some(outcome),
        })
    }
}
