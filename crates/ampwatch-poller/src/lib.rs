// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling pipeline for Ampwatch.
//!
//! - [`ReadingProcessor`] turns a portal payload into a delta-annotated
//!   [`Record`](ampwatch_core::Record) and persists it with deduplication.
//! - [`Poller`] runs one fetch-process-persist cycle at a time.
//! - [`PollScheduler`] re-runs the cycle on a minute-aligned cadence until
//!   cancelled.

pub mod cycle;
pub mod processor;
pub mod scheduler;
pub mod source;

pub use cycle::{CycleOutcome, Poller};
pub use processor::ReadingProcessor;
pub use scheduler::{PollScheduler, next_run_after};
pub use source::ReadingSource;
