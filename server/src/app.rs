//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::duckdb::DuckdbService;
use crate::domain::pages::PageCatalog;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub db: Arc<DuckdbService>,
    pub catalog: Arc<PageCatalog>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        match command {
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let db = match &config.database {
            Some(path) => DuckdbService::init(path)
                .await
                .with_context(|| format!("Failed to open database: {}", path.display()))?,
            None => {
                tracing::warn!("No database file configured, using an in-memory store");
                DuckdbService::init_in_memory()?
            }
        };
        let db = Arc::new(db);

        let catalog = Arc::new(PageCatalog::load(&config.pages)?);
        let shutdown = ShutdownService::new(db.clone());

        Ok(Self {
            shutdown,
            config,
            db,
            catalog,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.install_signal_handlers();

        let server = ApiServer::new(app);
        let app = server.start().await?;

        app.shutdown.shutdown().await;
        Ok(())
    }
}
