// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use ampwatch_config::model::GatewayConfig;
use ampwatch_core::{AmpwatchError, LogStore};
use ampwatch_poller::Poller;
use ampwatch_portal::PortalClient;
use axum::{Router, middleware as axum_middleware, routing::get};
use jiff::tz::TimeZone;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Cycle runner shared with the scheduler.
    pub poller: Arc<Poller>,
    /// Portal session, for logout and health.
    pub portal: Arc<PortalClient>,
    pub store: Arc<dyn LogStore>,
    /// Zone used to stamp export filenames.
    pub tz: TimeZone,
    pub auth: AuthConfig,
}

/// Bind address of the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Builds the router: public `/` and `/health`, token-protected `/get`,
/// `/logs` and `/logout`, and an enveloped 404 for everything else.
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/", get(handlers::get_latest))
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/get", get(handlers::get_reading))
        .route("/logs", get(handlers::get_logs))
        .route("/logout", get(handlers::get_logout))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `cancel` fires, then drains open connections.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), AmpwatchError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AmpwatchError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| AmpwatchError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_from_gateway_config() {
        let config = ServerConfig::from(&GatewayConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8088);
    }
}
