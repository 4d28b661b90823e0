//! HTTP route handlers.

pub mod chat;
pub mod news;
pub mod weather;

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_allow_origin.as_deref());

    Router::new()
        .route("/", get(root))
        .merge(chat::routes())
        .merge(news::routes())
        .merge(weather::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Ignoring invalid CORS_ALLOW_ORIGIN {:?}", origin);
            CorsLayer::permissive()
        }
    }
}

/// GET /: liveness.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "llmhub gateway is running" }))
}

/// Error body `{ "detail": ... }` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

impl From<llmhub_core::Error> for ApiError {
    fn from(e: llmhub_core::Error) -> Self {
        if e.is_client_error() {
            ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
        } else {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        }
    }
}
