// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storefront HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the web front.

use std::sync::Arc;

use axum::{Router, routing::get};
use souq_config::ConfigStore;
use souq_config::model::ServerConfig;
use souq_core::SouqError;
use souq_storage::{CatalogStore, PendingUploads};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// What the running bot session reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotStatus {
    /// Masked token the bot is polling with.
    pub masked_token: String,
    /// Whether that token is the one in the current configuration.
    pub in_sync: bool,
}

type BotStatusFn = Arc<dyn Fn() -> Option<BotStatus> + Send + Sync>;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Current configuration snapshot.
    pub config: ConfigStore,
    /// Catalog file at the configured path.
    pub catalog: CatalogStore,
    /// Chats waiting to attach a product photo.
    pub uploads: PendingUploads,
    /// Reports the running bot session, if any.
    pub bot_status: Option<BotStatusFn>,
}

impl GatewayState {
    pub fn new(config: ConfigStore, uploads: PendingUploads) -> Self {
        Self {
            catalog: CatalogStore::new(config.clone()),
            config,
            uploads,
            bot_status: None,
        }
    }

    /// Sets the bot status source shown on the admin page and /health.
    pub fn with_bot_status(
        mut self,
        status: impl Fn() -> Option<BotStatus> + Send + Sync + 'static,
    ) -> Self {
        self.bot_status = Some(Arc::new(status));
        self
    }

    pub fn bot_status(&self) -> Option<BotStatus> {
        self.bot_status.as_ref().and_then(|status| status())
    }

    pub fn bot_active(&self) -> bool {
        self.bot_status().is_some()
    }
}

/// Builds the storefront router.
///
/// - GET /
/// - GET /admin-page
/// - GET, PUT /products.json
/// - GET /photos/{*filename}
/// - GET /health
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/admin-page", get(handlers::admin_page))
        .route(
            "/products.json",
            get(handlers::get_catalog).put(handlers::put_catalog),
        )
        .route("/photos/{*filename}", get(handlers::get_photo))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the storefront server and run until `shutdown` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), SouqError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SouqError::Transport {
            message: format!("failed to bind web server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("web server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| SouqError::Transport {
            message: format!("web server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("web server stopped");
    Ok(())
}
