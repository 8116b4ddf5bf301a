// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the storefront.
//!
//! Every handler reads the configuration snapshot once at request time and
//! uses that snapshot for the whole request.

use axum::{
    Json,
    body::Bytes,
    extract::{Request, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use souq_storage::{CatalogError, ProductRecord};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, warn};

use crate::server::GatewayState;
use crate::templates::{self, AdminTemplate};

/// Body returned by the photo route when no configuration is loaded.
pub const PHOTOS_NOT_CONFIGURED: &str = "Photos directory not configured";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub configured: bool,
    pub bot_active: bool,
}

/// Response body for PUT /products.json.
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub saved: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /
pub async fn index() -> Html<String> {
    templates::render_index()
}

/// GET /admin-page
pub async fn admin_page(State(state): State<GatewayState>) -> Html<String> {
    let config = state.config.current();
    let template = AdminTemplate::new(config.as_deref(), state.bot_status(), state.uploads.len());
    templates::render_admin(&template)
}

/// GET /health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        configured: state.config.is_configured(),
        bot_active: state.bot_active(),
    })
}

/// GET /products.json
///
/// Streams the catalog file from the configured path.
pub async fn get_catalog(State(state): State<GatewayState>, req: Request) -> Response {
    let Some(path) = state.catalog.path() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match ServeFile::new(path).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

/// PUT /products.json
///
/// Replaces the catalog. The body must be a JSON array of records.
pub async fn put_catalog(State(state): State<GatewayState>, body: Bytes) -> Response {
    let records: Vec<ProductRecord> = match serde_json::from_slice(&body) {
        Ok(records) => records,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("expected a JSON array of products: {e}"),
            );
        }
    };

    match state.catalog.write(&records).await {
        Ok(()) => Json(SavedResponse {
            saved: records.len(),
        })
        .into_response(),
        Err(CatalogError::NotConfigured) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "storefront is not configured")
        }
        Err(e) => {
            error!(error = %e, "catalog write failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to save catalog")
        }
    }
}

/// GET /photos/{*filename}
///
/// Serves a file from the configured photos directory. Path traversal is
/// rejected by `ServeDir`, which answers 404 for any `..` component.
pub async fn get_photo(State(state): State<GatewayState>, req: Request) -> Response {
    let Some(config) = state.config.current() else {
        return (StatusCode::NOT_FOUND, PHOTOS_NOT_CONFIGURED).into_response();
    };

    let (mut parts, body) = req.into_parts();
    let relative = {
        let path = parts.uri.path();
        path.strip_prefix("/photos").unwrap_or(path).to_string()
    };
    parts.uri = match relative.parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            warn!(path = %relative, error = %e, "rejecting unparsable photo path");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match ServeDir::new(config.photos_dir())
        .oneshot(Request::from_parts(parts, body))
        .await
    {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}
