//! # Ticket-Bridge Service
//!
//! Binary entry point for the Ticket-Bridge HTTP service.
//!
//! This executable:
//! - Loads configuration from files and the environment
//! - Initializes structured logging
//! - Builds the OpenProject client and the sync handler
//! - Starts the HTTP server from ticket-bridge-api

mod settings;

use std::sync::Arc;

use openproject_client::OpenProjectClient;
use ticket_bridge_api::{start_server, LoggingConfig, ServiceError};
use ticket_bridge_core::{OpenProjectTracker, SyncHandler};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let explicit_path = settings::explicit_config_path(|name| std::env::var(name).ok());
    let loaded = settings::load_service_config(explicit_path.as_deref());

    // A broken configuration still gets logged with the default format.
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting Ticket-Bridge Service");

    if let Some(path) = &explicit_path {
        info!(path = %path, "Using configuration file named by TB_CONFIG_FILE");
    }

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    let sync_settings = match service_config.sync_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Mapping tables are invalid; aborting");
            std::process::exit(3);
        }
    };

    if sync_settings.custom_field.is_none() {
        warn!(
            "No correlation custom field configured; every webhook will fail until tracker.custom_field (OP_CUSTOM_FIELD) is set"
        );
    }

    let missing = sync_settings.statuses.missing_states();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        warn!(states = ?names, "Ticket states without a status mapping");
    }

    info!(
        assignees = sync_settings.assignees.len(),
        statuses = sync_settings.statuses.len(),
        project = %service_config.tracker.project,
        "Loaded mapping tables"
    );

    let client = match OpenProjectClient::new(service_config.client_config()) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create OpenProject client; aborting");
            std::process::exit(3);
        }
    };

    let tracker = Arc::new(OpenProjectTracker::new(
        client,
        service_config.tracker.project.clone(),
    ));
    let sync_handler = Arc::new(SyncHandler::new(tracker, sync_settings));

    info!(
        host = %service_config.server.host,
        port = service_config.server.port,
        "Starting HTTP server"
    );

    if let Err(e) = start_server(service_config, sync_handler).await {
        error!("Failed to start server: {}", e);

        let exit_code = match e {
            ServiceError::BindFailed { .. } => 1,
            ServiceError::ServerFailed { .. } => 2,
            ServiceError::Configuration(_) => 3,
        };

        std::process::exit(exit_code);
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ticket_bridge_service={level},ticket_bridge_api={level},ticket_bridge_core={level},openproject_client={level},tower_http={level}",
            level = logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
