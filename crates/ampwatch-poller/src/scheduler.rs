// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-rescheduling poll timer.
//!
//! Each tick fixes the next run time (current minute plus the interval)
//! before doing any work, then runs one cycle in its own task. Failures and
//! panics are logged here and never stop the loop; only cancellation does.

use std::sync::Arc;
use std::time::Duration;

use ampwatch_core::{AmpwatchError, PersistOutcome};
use jiff::tz::TimeZone;
use jiff::{RoundMode, SignedDuration, Unit, Zoned, ZonedRound};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cycle::Poller;

/// `now` truncated to the minute, plus `interval`.
pub fn next_run_after(now: &Zoned, interval: Duration) -> Result<Zoned, AmpwatchError> {
    let interval = SignedDuration::try_from(interval)
        .map_err(|e| AmpwatchError::Config(format!("poll interval out of range: {e}")))?;
    now.round(ZonedRound::new().smallest(Unit::Minute).mode(RoundMode::Trunc))
        .and_then(|minute| minute.checked_add(interval))
        .map_err(|e| AmpwatchError::Internal(format!("cannot compute next run time: {e}")))
}

pub struct PollScheduler {
    poller: Arc<Poller>,
    interval: Duration,
    tz: TimeZone,
}

impl PollScheduler {
    pub fn new(poller: Arc<Poller>, interval: Duration, tz: TimeZone) -> Self {
        Self {
            poller,
            interval,
            tz,
        }
    }

    /// Fixes the next run time, then runs one cycle and logs how it went.
    pub async fn tick(&self) -> Result<Zoned, AmpwatchError> {
        let next_run = next_run_after(&Zoned::now().with_time_zone(self.tz.clone()), self.interval)?;
        info!(
            next_run = %next_run.strftime("%Y-%m-%d %H:%M:%S"),
            "next poll scheduled"
        );

        // A panicking cycle only takes its own task down.
        let poller = self.poller.clone();
        let cycle = tokio::spawn(async move { poller.run_cycle().await });
        let result = match cycle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "poll cycle panicked, this cycle is discarded");
                return Ok(next_run);
            }
        };

        match result {
            Ok(outcome) => match outcome.persisted {
                Some(PersistOutcome::Inserted(id)) => info!(id, "reading inserted"),
                Some(PersistOutcome::SkippedDuplicate) => {
                    info!("same reading already stored, skipping")
                }
                None => {}
            },
            Err(e) if e.is_transport() => {
                error!(error = %e, "portal unreachable, this cycle is discarded")
            }
            Err(e) if e.is_login_failure() => {
                error!(error = %e, "portal login failed, this cycle is discarded")
            }
            Err(e) => error!(error = %e, "poll cycle failed"),
        }

        Ok(next_run)
    }

    /// Runs the first cycle immediately, then one per interval until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "poll scheduler started");

        loop {
            let next_run = match self.tick().await {
                Ok(next_run) => next_run,
                Err(e) => {
                    error!(error = %e, "poll scheduler stopped");
                    break;
                }
            };
            let wait = Duration::try_from(Zoned::now().duration_until(&next_run))
                .unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => {
                    info!("poll scheduler shutting down");
                    break;
                }
            }
        }
    }
}
