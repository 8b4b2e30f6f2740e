use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::constants::{ENV_CONFIG, ENV_DATABASE, ENV_HOST, ENV_PAGES, ENV_PORT};

#[derive(Parser)]
#[command(name = "datapage")]
#[command(version, about = "Filterable paginated pages over DuckDB tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the DuckDB database file
    #[arg(long, global = true, env = ENV_DATABASE)]
    pub database: Option<PathBuf>,

    /// Path to the page catalog JSON file
    #[arg(long, global = true, env = ENV_PAGES)]
    pub pages: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// CLI values that feed into config resolution
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub pages: Option<PathBuf>,
}

pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        database: cli.database,
        pages: cli.pages,
    };
    (config, cli.command)
}
