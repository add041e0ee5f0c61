// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where readings come from.

use async_trait::async_trait;

use ampwatch_core::AmpwatchError;
use ampwatch_portal::{PortalClient, ReadingResult};

/// A source of raw reading payloads.
#[async_trait]
pub trait ReadingSource: Send + Sync + 'static {
    /// Fetches the payload for `cust_id`, or for the account's own dormitory.
    async fn fetch_reading(&self, cust_id: Option<&str>) -> Result<ReadingResult, AmpwatchError>;
}

#[async_trait]
impl ReadingSource for PortalClient {
    async fn fetch_reading(&self, cust_id: Option<&str>) -> Result<ReadingResult, AmpwatchError> {
        PortalClient::fetch_reading(self, cust_id).await
    }
}
