//! Configuration loading from files and the environment.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `/etc/ticket-bridge/service.yaml`
//! 2. `./config/service.yaml`
//! 3. The file named by `TB_CONFIG_FILE`
//! 4. Environment variables prefixed `TB__`, e.g. `TB__SERVER__PORT=9090`
//! 5. The flat variable names older deployments use, e.g. `OP_TOKEN`

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use ticket_bridge_api::ServiceConfig;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_FILE_ENV: &str = "TB_CONFIG_FILE";

/// Flat variable names and the configuration keys they set.
pub const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("OP_URL", "tracker.base_url"),
    ("OP_TOKEN", "tracker.api_token"),
    ("OP_PROJECT", "tracker.project"),
    ("OP_CUSTOM_FIELD", "tracker.custom_field"),
    ("SECRET_TOKEN", "webhook.secret"),
    ("URL_PREFIX", "webhook.url_prefix"),
    ("ASSIGNEES", "mappings.assignees"),
    ("STATUS_MAP", "mappings.status_map"),
];

/// Path named by `TB_CONFIG_FILE`. An empty value counts as unset.
pub fn explicit_config_path<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CONFIG_FILE_ENV).filter(|path| !path.trim().is_empty())
}

/// Load the service configuration from every source.
///
/// Runs before logging is set up, so it logs nothing itself.
pub fn load_service_config(explicit_path: Option<&str>) -> Result<ServiceConfig, ConfigError> {
    let mut builder = Config::builder()
        .add_source(
            File::with_name("/etc/ticket-bridge/service")
                .required(false)
                .format(FileFormat::Yaml),
        )
        .add_source(
            File::with_name("config/service")
                .required(false)
                .format(FileFormat::Yaml),
        );

    if let Some(explicit_path) = explicit_path {
        builder = builder.add_source(
            File::with_name(explicit_path)
                .required(true)
                .format(FileFormat::Yaml),
        );
    }

    let builder = builder.add_source(Environment::with_prefix("TB").separator("__"));
    let builder = apply_legacy_env(builder, |name| std::env::var(name).ok())?;

    builder.build()?.try_deserialize()
}

/// Override keys from the flat variable names. Empty values count as unset.
pub fn apply_legacy_env<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (name, key) in LEGACY_ENV_KEYS {
        let value = lookup(name).filter(|v| !v.trim().is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder)
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
