//! Server configuration.
//!
//! Read from ~/.config/dinecal/server.toml when present, then overridden by
//! `DINECAL_SERVER_*` environment variables (e.g. `DINECAL_SERVER_BIND`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_BIND: &str = "127.0.0.1:37767";
const DEFAULT_DATA_DIR: &str = "~/.dinecal";

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Holds events.json.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Defaults to `<data_dir>/uploads`.
    pub upload_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dinecal");

        Ok(config_dir.join("server.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("DINECAL_SERVER"))
            .build()
            .context("Failed to read server configuration")?
            .try_deserialize()
            .context("Invalid server configuration")
    }

    pub fn data_path(&self) -> PathBuf {
        expand(&self.data_dir)
    }

    pub fn upload_path(&self) -> PathBuf {
        match &self.upload_dir {
            Some(dir) => expand(dir),
            None => self.data_path().join("uploads"),
        }
    }
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
