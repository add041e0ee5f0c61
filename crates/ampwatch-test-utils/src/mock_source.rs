// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted reading source for deterministic testing.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ampwatch_core::AmpwatchError;
use ampwatch_poller::ReadingSource;
use ampwatch_portal::ReadingResult;

/// A successful `geteldorbaseinfo` body with the given amounts and time.
pub fn reading_payload(used_amp: &str, res_amp: &str, time: &str) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "state": 200,
        "data": {
            "Usedamp": used_amp,
            "Resamp": res_amp,
            "Time": time,
            "Id": 5678,
            "Addr": "A-101",
            "Name": "Block A"
        }
    })
}

/// A reading source that returns scripted results in FIFO order.
///
/// Once the script runs out every call fails with a transport error.
#[derive(Default)]
pub struct MockReadingSource {
    script: Mutex<VecDeque<Result<ReadingResult, AmpwatchError>>>,
    requests: Mutex<Vec<Option<String>>>,
}

impl MockReadingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reading.
    pub async fn push_reading(&self, used_amp: &str, res_amp: &str, time: &str) {
        self.push_payload(reading_payload(used_amp, res_amp, time))
            .await;
    }

    /// Queues an arbitrary payload. Panics if it is not a reading envelope.
    pub async fn push_payload(&self, payload: serde_json::Value) {
        let parsed: ReadingResult =
            serde_json::from_value(payload).expect("payload must be a reading envelope");
        self.script.lock().await.push_back(Ok(parsed));
    }

    /// Queues a failure.
    pub async fn push_error(&self, error: AmpwatchError) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Customer ids requested so far, in call order.
    pub async fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ReadingSource for MockReadingSource {
    async fn fetch_reading(&self, cust_id: Option<&str>) -> Result<ReadingResult, AmpwatchError> {
        self.requests.lock().await.push(cust_id.map(str::to_string));
        self.script.lock().await.pop_front().unwrap_or_else(|| {
            Err(AmpwatchError::Transport {
                message: "mock source script exhausted".to_string(),
                source: None,
            })
        })
    }
}
