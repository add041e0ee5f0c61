// SPDX-FileCopyrightText: 2026 Ampwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ampwatch serve` command implementation.
//!
//! Opens the log store, builds the portal client and poller, then runs the
//! poll scheduler and the HTTP gateway side by side until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use ampwatch_config::model::AmpwatchConfig;
use ampwatch_core::{AmpwatchError, LogStore};
use ampwatch_gateway::{AuthConfig, GatewayState, ServerConfig};
use ampwatch_poller::{PollScheduler, Poller, ReadingProcessor, ReadingSource};
use ampwatch_portal::PortalClient;
use ampwatch_storage::SqliteLogStore;
use jiff::tz::TimeZone;
use tracing::{error, info, warn};

use crate::shutdown;

/// Portal client, store and poller built from one configuration.
pub struct Pipeline {
    pub portal: Arc<PortalClient>,
    pub store: Arc<SqliteLogStore>,
    pub poller: Arc<Poller>,
    pub tz: TimeZone,
}

impl Pipeline {
    pub async fn open(config: &AmpwatchConfig) -> Result<Self, AmpwatchError> {
        let tz = config.poll.time_zone()?;
        let store = Arc::new(SqliteLogStore::open(&config.storage, tz.clone()).await?);
        let portal = Arc::new(PortalClient::from_config(&config.portal)?);

        let source: Arc<dyn ReadingSource> = portal.clone();
        let processor = ReadingProcessor::new(store.clone(), tz.clone(), config.poll.record_identity);
        let poller = Arc::new(Poller::new(source, processor, config.portal.cust_id.clone()));

        Ok(Self {
            portal,
            store,
            poller,
            tz,
        })
    }

    pub async fn close(&self) {
        if let Err(e) = self.store.close().await {
            warn!(error = %e, "failed to close log store cleanly");
        }
    }
}

/// Runs the `ampwatch serve` command.
pub async fn run_serve(config: AmpwatchConfig) -> Result<(), AmpwatchError> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting ampwatch serve");

    let pipeline = Pipeline::open(&config).await?;
    let cancel = shutdown::install_signal_handler();

    let scheduler = if config.poll.enabled {
        let scheduler = PollScheduler::new(
            pipeline.poller.clone(),
            Duration::from_secs(config.poll.interval_secs),
            pipeline.tz.clone(),
        );
        let token = cancel.clone();
        Some(tokio::spawn(async move { scheduler.run(token).await }))
    } else {
        info!("polling disabled, serving stored logs only");
        None
    };

    let served = if config.gateway.enabled {
        if config.gateway.access_token.is_none() {
            warn!(
                "gateway.access_token is not set; /get, /logs and /logout are open to anyone who can reach {}:{}",
                config.gateway.host, config.gateway.port
            );
        }
        let state = GatewayState {
            poller: pipeline.poller.clone(),
            portal: pipeline.portal.clone(),
            store: pipeline.store.clone(),
            tz: pipeline.tz.clone(),
            auth: AuthConfig::new(config.gateway.access_token.clone()),
        };
        let served =
            ampwatch_gateway::start_server(&ServerConfig::from(&config.gateway), state, cancel.clone())
                .await;
        if let Err(e) = &served {
            error!(error = %e, "gateway stopped with an error");
        }
        served
    } else {
        info!("gateway disabled");
        cancel.cancelled().await;
        Ok(())
    };

    cancel.cancel();
    if let Some(handle) = scheduler
        && let Err(e) = handle.await
    {
        error!(error = %e, "poll scheduler task panicked");
    }
    pipeline.close().await;
    info!("ampwatch stopped");
    served
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ampwatch={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
