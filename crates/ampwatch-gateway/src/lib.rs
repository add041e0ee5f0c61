// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Ampwatch.
//!
//! Exposes the stored log and the on-demand fetch over a small axum router.
//! Every JSON reply uses the `{status_code, message, data}` envelope from
//! [`response`]; token-protected routes go through [`auth::auth_middleware`].
//!
//! | route        | auth | purpose                                  |
//! |--------------|------|------------------------------------------|
//! | `GET /`      | no   | newest stored record                     |
//! | `GET /health`| no   | store health and portal session state    |
//! | `GET /get`   | yes  | fetch, process and store one reading     |
//! | `GET /logs`  | yes  | recent records as JSON or CSV attachment |
//! | `GET /logout`| yes  | end the portal session                   |

pub mod auth;
pub mod export;
pub mod handlers;
pub mod response;
pub mod server;

pub use auth::AuthConfig;
pub use response::{ApiError, Envelope};
pub use server::{GatewayState, ServerConfig, router, start_server};
