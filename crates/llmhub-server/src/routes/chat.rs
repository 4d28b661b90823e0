//! Chat routes: provider listing and dispatch.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::error;

use super::ApiError;
use crate::state::AppState;
use llmhub_chat::types::*;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/providers", get(get_providers))
        .route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

/// GET /providers: registered provider identifiers.
async fn get_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.dispatcher.providers(),
    })
}

/// POST /chat?session_id=<id>
async fn chat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let session_id = query
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());

    match state.dispatcher.handle(&session_id, &req).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if !e.is_client_error() {
                error!("Chat failed for session {}: {}", session_id, e);
            }
            Err(e.into())
        }
    }
}
