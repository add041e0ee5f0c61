// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access-token middleware for the gateway.
//!
//! The token is accepted from either source, checked in order:
//! 1. `Authorization: Bearer <token>`
//! 2. the `access_token` query parameter
//!
//! When no token is configured every request passes. The binary warns about
//! this at startup.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::response::ApiError;

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected access token. `None` disables the check.
    pub access_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

impl AuthConfig {
    pub fn new(access_token: Option<String>) -> Self {
        Self { access_token }
    }

    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Rejects the request with a 401 envelope unless it carries the configured token.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = auth.access_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let bearer = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if bearer == Some(expected) {
        return Ok(next.run(request).await);
    }

    let query = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.access_token);
    if query.as_deref() == Some(expected) {
        return Ok(next.run(request).await);
    }

    tracing::debug!(path = %request.uri().path(), "rejected request with invalid access token");
    Err(ApiError::new(
        axum::http::StatusCode::UNAUTHORIZED,
        "invalid access_token",
    ))
}
