// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ampwatch integration tests.
//!
//! Provides fakes and harness infrastructure for fast, deterministic tests
//! without the real portal.
//!
//! # Components
//!
//! - [`MockReadingSource`] - scripted reading payloads and failures
//! - [`MemoryLogStore`] - in-memory [`LogStore`](ampwatch_core::LogStore)
//! - [`MockPortal`] - wiremock server speaking the portal's endpoints
//! - [`TestHarness`] - source, store and poller wired together

pub mod harness;
pub mod memory_store;
pub mod mock_portal;
pub mod mock_source;

pub use harness::TestHarness;
pub use memory_store::MemoryLogStore;
pub use mock_portal::MockPortal;
pub use mock_source::{MockReadingSource, reading_payload};
