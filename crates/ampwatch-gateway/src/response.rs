// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response envelope and the error-to-status mapping.

use ampwatch_core::AmpwatchError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Body of every JSON reply.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    /// A 200 reply with an empty message.
    pub fn ok(data: T) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: String::new(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// A failed request, rendered as an envelope with empty `data`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AmpwatchError> for ApiError {
    fn from(err: AmpwatchError) -> Self {
        let status = match &err {
            AmpwatchError::Transport { .. }
            | AmpwatchError::LoginFailed(_)
            | AmpwatchError::Protocol(_)
            | AmpwatchError::MalformedReading(_) => StatusCode::BAD_GATEWAY,
            AmpwatchError::Persist { .. } | AmpwatchError::StorageUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AmpwatchError::AccessDenied => StatusCode::UNAUTHORIZED,
            AmpwatchError::Config(_) | AmpwatchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Envelope {
            status_code: self.status.as_u16(),
            message: self.message,
            data: serde_json::json!({}),
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ok_has_empty_message() {
        let json = serde_json::to_value(Envelope::ok(vec![1, 2])).unwrap();
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["message"], "");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn portal_failures_map_to_bad_gateway() {
        let err = ApiError::from(AmpwatchError::LoginFailed("state 500".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let err = ApiError::from(AmpwatchError::MalformedReading("missing Usedamp".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.message().contains("Usedamp"));
    }

    #[test]
    fn storage_failures_map_to_service_unavailable() {
        let err = ApiError::from(AmpwatchError::persist("disk full"));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn error_response_carries_status() {
        let response = ApiError::not_found("Not Found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
