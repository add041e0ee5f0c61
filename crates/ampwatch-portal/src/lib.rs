// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authenticated client for the student electricity portal.
//!
//! [`PortalClient`] owns the portal session: cookie bootstrap, login with a
//! single transparent re-login on failed authenticated calls, logout, and the
//! dormitory reading query. Response bodies are decoded into the typed
//! payloads in [`types`].

pub mod client;
pub mod headers;
pub mod session;
pub mod types;

pub use client::{Access, LoginOutcome, PortalClient, PortalResponse};
pub use session::{Credentials, Identity, SessionState};
pub use types::{BindingInfo, IndexResponse, LoginResult, PortalValue, ReadingData, ReadingResult};
