//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::openapi::openapi_json;
use super::routes::{health, pages};
use crate::core::CoreApp;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.host.parse()?, app.config.port);

        let pages_routes = pages::routes(app.db.clone(), app.catalog.clone());

        let router = Router::new()
            .route("/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .nest("/api/v1/pages", pages_routes)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{addr}");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
