use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::cli::CliConfig;
use super::constants::{DEFAULT_HOST, DEFAULT_PORT};

/// Raw config file shape, every field optional
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    database: Option<PathBuf>,
    pages: Option<PathBuf>,
}

impl FileConfig {
    fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

/// Resolved application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// DuckDB database file; in-memory when absent
    pub database: Option<PathBuf>,
    /// Page catalog JSON file
    pub pages: PathBuf,
}

impl AppConfig {
    /// Load configuration from all sources.
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. CLI-specified config file
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let file_config = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                FileConfig::load_from_file(path)?
            }
            None => FileConfig::default(),
        };

        let pages = cli
            .pages
            .clone()
            .or(file_config.pages)
            .context("No page catalog configured (set --pages or DATAPAGE_PAGES)")?;

        Ok(Self {
            host: cli
                .host
                .clone()
                .or(file_config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_config.port).unwrap_or(DEFAULT_PORT),
            database: cli.database.clone().or(file_config.database),
            pages,
        })
    }
}
