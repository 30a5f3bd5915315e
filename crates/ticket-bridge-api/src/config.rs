//! Configuration types for the HTTP service

use std::time::Duration;

use openproject_client::ClientConfig;
use serde::{Deserialize, Serialize};
use ticket_bridge_core::{AssigneeMap, StatusMap, SyncSettings};

use crate::errors::ConfigError;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// OpenProject connection settings
    pub tracker: TrackerConfig,

    /// Inbound webhook settings
    pub webhook: WebhookConfig,

    /// Helpdesk → OpenProject mapping tables
    pub mappings: MappingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check that every required value is present and well formed.
    ///
    /// The correlation custom field is deliberately not required here: a
    /// fresh installation runs without it so the operator can discover the
    /// field name from the logs, and each request fails with 500 until set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("tracker.base_url", &self.tracker.base_url)?;
        require("tracker.api_token", &self.tracker.api_token)?;
        require("tracker.project", &self.tracker.project)?;
        require("webhook.secret", &self.webhook.secret)?;
        require("webhook.url_prefix", &self.webhook.url_prefix)?;

        let base_url = self.tracker.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "tracker.base_url must be an http(s) URL, got '{}'",
                    self.tracker.base_url
                ),
            });
        }

        if self.webhook.secret.contains('/') {
            return Err(ConfigError::Invalid {
                message: "webhook.secret must be a single path segment".to_string(),
            });
        }

        if self.tracker.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                message: "tracker.timeout_seconds must be greater than zero".to_string(),
            });
        }

        self.sync_settings().map(|_| ())
    }

    /// Parse the mapping tables into the settings used by the sync handler.
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        let assignees =
            AssigneeMap::parse(&self.mappings.assignees).map_err(|source| ConfigError::Mapping {
                key: "mappings.assignees".to_string(),
                source,
            })?;
        let statuses =
            StatusMap::parse(&self.mappings.status_map).map_err(|source| ConfigError::Mapping {
                key: "mappings.status_map".to_string(),
                source,
            })?;

        let custom_field = self
            .tracker
            .custom_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string);

        Ok(SyncSettings::new(
            self.webhook.url_prefix.clone(),
            custom_field,
            assignees,
            statuses,
        ))
    }

    /// OpenProject client configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.tracker.base_url.trim(), self.tracker.api_token.clone())
            .with_timeout(Duration::from_secs(self.tracker.timeout_seconds))
    }
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// OpenProject connection configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Instance base URL, e.g. `https://openproject.example.com`
    pub base_url: String,

    /// API access token
    pub api_token: String,

    /// Project identifier or id
    pub project: String,

    /// Custom field holding the ticket URL, e.g. `customField2`
    pub custom_field: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            project: String::new(),
            custom_field: None,
            timeout_seconds: 30,
        }
    }
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("project", &self.project)
            .field("custom_field", &self.custom_field)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Inbound webhook configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Shared secret expected as the single path segment
    pub secret: String,

    /// Canonical ticket URL prefix; the ticket id is appended
    pub url_prefix: String,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &"<REDACTED>")
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// Mapping tables, each as comma separated `key:reference` pairs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Owner id → assignee, e.g. `7:/api/v3/users/9`
    pub assignees: String,

    /// Ticket state → status, e.g. `open:/api/v3/statuses/7`
    pub status_map: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
