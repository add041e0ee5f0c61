// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use ampwatch_core::{HealthStatus, LogEntry, SortOrder};
use ampwatch_portal::SessionState;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use jiff::Zoned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::export::{entries_to_csv, export_filename};
use crate::response::{ApiError, Envelope};
use crate::server::GatewayState;

/// Query string of `GET /get`.
#[derive(Debug, Default, Deserialize)]
pub struct FetchParams {
    /// Customer to query; empty or absent means the configured one.
    #[serde(default)]
    pub cust_id: Option<String>,
}

/// Output format of `GET /logs`. `0` and `1` are accepted for JSON and CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    #[default]
    #[serde(alias = "0")]
    Json,
    #[serde(alias = "1")]
    Csv,
}

/// Query string of `GET /logs`.
#[derive(Debug, Deserialize)]
pub struct LogsParams {
    /// Number of entries; zero means all.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Newest first when true.
    #[serde(default = "default_reverse")]
    pub reverse: bool,
    #[serde(default)]
    pub file_type: FileType,
}

fn default_limit() -> usize {
    1
}

fn default_reverse() -> bool {
    true
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub session: SessionState,
    pub version: String,
}

/// GET /
///
/// Newest stored record. Unauthenticated.
pub async fn get_latest(State(state): State<GatewayState>) -> Result<Envelope<LogEntry>, ApiError> {
    state
        .store
        .latest()
        .await?
        .map(Envelope::ok)
        .ok_or_else(|| ApiError::not_found("No logs found"))
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (status, detail) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, format!("degraded: {reason}")),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "unavailable" }.to_string(),
        store: detail,
        session: state.portal.state().await,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Envelope {
        status_code: status.as_u16(),
        message: String::new(),
        data: body,
    }
    .into_response()
}

/// GET /get?cust_id=
///
/// Runs one cycle. `data` is the record plus `is_inserted`; a customer id
/// other than the configured one is only previewed.
pub async fn get_reading(
    State(state): State<GatewayState>,
    params: Result<Query<FetchParams>, QueryRejection>,
) -> Result<Envelope<Value>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let cust_id = params.cust_id.filter(|id| !id.trim().is_empty());

    let outcome = state
        .poller
        .fetch_on_demand(cust_id.as_deref())
        .await
        .inspect_err(|e| warn!(error = %e, "on-demand fetch failed"))?;

    let mut data = serde_json::to_value(&outcome.record)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if let Value::Object(map) = &mut data {
        map.insert("is_inserted".to_string(), Value::Bool(outcome.is_inserted()));
    }
    Ok(Envelope::ok(data))
}

/// GET /logs?limit=1&reverse=true&file_type=json
pub async fn get_logs(
    State(state): State<GatewayState>,
    params: Result<Query<LogsParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let order = if params.reverse {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let entries = state.store.most_recent(params.limit, order).await?;

    match params.file_type {
        FileType::Json => Ok(Envelope::ok(entries).into_response()),
        FileType::Csv => {
            let body = entries_to_csv(&entries)?;
            let filename = export_filename(&Zoned::now().with_time_zone(state.tz.clone()));
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// GET /logout
pub async fn get_logout(State(state): State<GatewayState>) -> Result<Envelope<Value>, ApiError> {
    state.portal.logout().await?;
    info!("portal session ended on request");
    Ok(Envelope::ok(serde_json::json!({})))
}

/// Any unmatched route.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_params_defaults() {
        let Query(params) =
            Query::<LogsParams>::try_from_uri(&"/logs".parse().unwrap()).unwrap();
        assert_eq!(params.limit, 1);
        assert!(params.reverse);
        assert_eq!(params.file_type, FileType::Json);
    }

    #[test]
    fn file_type_accepts_numeric_aliases() {
        let Query(params) =
            Query::<LogsParams>::try_from_uri(&"/logs?file_type=1&limit=0&reverse=false".parse().unwrap())
                .unwrap();
        assert_eq!(params.file_type, FileType::Csv);
        assert_eq!(params.limit, 0);
        assert!(!params.reverse);
    }

    #[test]
    fn health_response_serializes_session_state() {
        let json = serde_json::to_value(HealthResponse {
            status: "ok".into(),
            store: "healthy".into(),
            session: SessionState::LoggedOut,
            version: "0.1.0".into(),
        })
        .unwrap();
        assert_eq!(json["session"], "logged_out");
    }
}
