//! Server module for managing the gateway lifecycle
//!
//! Startup order: channel store and provider check, error-log marker,
//! heartbeat, route table, bind, serve until a shutdown signal, stop jobs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::Settings;
use crate::config::error::ConfigError;
use crate::external::{HttpTransport, ReqwestTransport};
use crate::jobs::{Heartbeat, JobScheduler};
use crate::services::notifications::ProviderRegistry;
use crate::services::{ConfigStore, ErrorLog, Services};
use crate::state::AppState;

/// Channel store, provider registry and error log built from settings
pub struct Components {
    pub store: Arc<ConfigStore>,
    pub registry: ProviderRegistry,
    pub error_log: Arc<ErrorLog>,
}

impl Components {
    /// Build and cross-check everything the push path needs.
    ///
    /// # Errors
    /// Missing route, duplicate channel names, or a channel kind without a
    /// registered provider.
    pub fn build(settings: &Settings, transport: Arc<dyn HttpTransport>) -> Result<Self, ConfigError> {
        let route = settings.push.route.clone().unwrap_or_default();
        let store = ConfigStore::new(route, settings.channel_configs())?;

        let registry = ProviderRegistry::with_builtin(
            transport,
            Duration::from_secs(settings.push.provider_timeout),
        );
        store.verify_providers(&registry)?;

        Ok(Self {
            store: Arc::new(store),
            registry,
            error_log: Arc::new(ErrorLog::new(&settings.push.error_log)),
        })
    }

    pub fn into_services(self) -> Services {
        Services::new(self.store, self.registry, self.error_log)
    }
}

/// One line per channel: `http://host:port/route/name  (kind)`
pub fn route_table(settings: &Settings, store: &ConfigStore) -> Vec<String> {
    let host = match settings.server.host.as_str() {
        "0.0.0.0" | "::" => "localhost",
        host => host,
    };

    store
        .channels()
        .iter()
        .map(|channel| {
            format!(
                "http://{}:{}/{}  ({})",
                host,
                settings.server.port,
                store.route_path(channel),
                channel.kind()
            )
        })
        .collect()
}

/// Gateway server
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the gateway and run until shutdown signal
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(
            app_name = %self.settings.application.name,
            app_version = %self.settings.application.version,
            "Application starting"
        );

        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new().context("Failed to build HTTP client")?);

        let components = Components::build(&self.settings, transport.clone())
            .context("Invalid channel configuration")?;

        if let Err(e) = components.error_log.write_startup_marker().await {
            tracing::warn!(
                path = %components.error_log.path().display(),
                error = %e,
                "Failed to write startup marker to error log"
            );
        }

        let scheduler = JobScheduler::new().await?;
        match Heartbeat::from_config(&self.settings.heartbeat, transport) {
            Some(heartbeat) => {
                tracing::info!(
                    url = %heartbeat.url(),
                    interval_secs = self.settings.heartbeat.interval,
                    "Heartbeat enabled"
                );
                scheduler.add(heartbeat.into_job()?).await?;
            }
            None => tracing::info!("Heartbeat not configured"),
        }
        scheduler.start().await?;

        tracing::info!(
            route = %components.store.route(),
            channels = components.store.channels().len(),
            error_log = %components.error_log.path().display(),
            "Push routes loaded"
        );
        for line in route_table(&self.settings, &components.store) {
            tracing::info!("  {}", line);
        }

        let router = create_router(AppState::new(components.into_services()));

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Err(e) = scheduler.stop().await {
            tracing::warn!(error = %e, "Failed to stop job scheduler");
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM.
///
/// If a signal handler cannot be installed the corresponding branch never
/// completes, so the server keeps running on the other one.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
