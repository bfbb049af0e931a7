use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use dinecal_core::SchemaVersion;
use serde::Deserialize;

use crate::notification::DEFAULT_TTL;

static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:37767";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_notification_ttl() -> String {
    humantime::format_duration(DEFAULT_TTL).to_string()
}

/// Client configuration at ~/.config/dinecal/config.toml
///
/// Every key can be overridden with a `DINECAL_` environment variable,
/// e.g. `DINECAL_SERVER_URL`.
#[derive(Deserialize, Clone)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// How long a notification stays visible, e.g. "4s".
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl: String,

    /// Record layout used when creating events.
    #[serde(default)]
    pub schema: SchemaVersion,
}

impl ClientConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("dinecal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Defaults apply without the file
            if let Err(e) = create_default_config(&config_path) {
                tracing::warn!("Could not write {}: {:#}", config_path.display(), e);
            }
        }

        Self::load_from(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DINECAL"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn notification_ttl(&self) -> Result<Duration> {
        humantime::parse_duration(&self.notification_ttl).with_context(|| {
            format!(
                "Invalid notification_ttl \"{}\" (expected e.g. \"4s\")",
                self.notification_ttl
            )
        })
    }
}

/// Create a default config file with all options commented out.
fn create_default_config(path: &Path) -> Result<()> {
    let contents = format!(
        "\
# dinecal configuration

# Where the dinecal server is running:
# server_url = \"{}\"

# How long notifications stay visible:
# notification_ttl = \"{}\"

# Record layout for new events (v1 folds category and end time into notes):
# schema = \"v2\"
",
        DEFAULT_SERVER_URL,
        default_notification_ttl()
    );

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Could not create config directory")?;
    }

    std::fs::write(path, contents).context("Could not write config file")?;

    Ok(())
}
