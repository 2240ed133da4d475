//! Web layer module
//!
//! HTTP interface for gribouillis. Handlers stay thin and delegate to the
//! [`IngestionPipeline`](crate::services::IngestionPipeline).
//!
//! # Routes
//!
//! All routes live under the configured base path:
//! - `POST /save` and `POST /save/`: upload a PNG drawing
//! - `GET /saved/<name>`: stored drawings, served from the store directory
//! - `GET /health`: liveness plus store usage
//! - anything else: the static drawing client, when configured

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bounded_file_store::BoundedStore;
use std::future::Future;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::{Config, WebConfig};
use crate::services::{AdmissionGate, IngestionPipeline};

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use responses::handle_error;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: BoundedStore,
    pub pipeline: IngestionPipeline,
}

impl AppState {
    pub fn new(config: &Config, store: BoundedStore) -> Self {
        let gate = Arc::new(AdmissionGate::new(config.ingestion.min_delay));
        let pipeline = IngestionPipeline::new(
            store.clone(),
            gate,
            config.web.saved_path(),
            config.ingestion.max_image_size.as_u64(),
        );
        Self { store, pipeline }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: String,
}

impl WebServer {
    pub fn new(config: &Config, store: BoundedStore) -> Self {
        let state = AppState::new(config, store);
        Self {
            app: create_router(state, &config.web),
            addr: config.listen_addr(),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Serve until SIGINT or SIGTERM, then drain in-flight requests.
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Build the application router, mounted under `web.base_path()`.
pub fn create_router(state: AppState, web: &WebConfig) -> Router {
    let saved_files = ServeDir::new(state.store.path());

    let mut routes = Router::new()
        .route(
            "/save",
            post(handlers::save::save_image).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/save/",
            post(handlers::save::save_image).layer(DefaultBodyLimit::disable()),
        )
        .route("/health", get(handlers::health::health_check))
        .nest_service("/saved", saved_files);

    if let Some(static_dir) = web.static_dir() {
        routes = routes.fallback_service(ServeDir::new(static_dir));
    }

    let routes = routes.with_state(state);
    let base = web.base_path();
    let app = if base.is_empty() {
        routes
    } else {
        Router::new().nest(&base, routes)
    };

    app.layer(axum::middleware::from_fn(
        middleware::request_logging_middleware,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
