//! News routes: headline, source and stock-feed pass-through.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use llmhub_news::{HeadlineQuery, NewsError, StockFeed};
use serde::Deserialize;
use serde_json::Value;

use super::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/news/global", get(global))
        .route("/news/in", get(india))
        .route("/news/sources", get(sources))
        .route("/news/combined", get(combined))
        .route("/news/stocks", get(stocks))
}

impl From<NewsError> for ApiError {
    fn from(e: NewsError) -> Self {
        let status = match e {
            NewsError::MissingKey => StatusCode::BAD_REQUEST,
            NewsError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NewsError::Upstream { .. } | NewsError::Api(_) | NewsError::Feed(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        ApiError::new(status, e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SourcesQuery {
    country: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StocksQuery {
    feed_url: Option<String>,
    limit: Option<usize>,
}

/// GET /news/global
async fn global(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.news.global().await?))
}

/// GET /news/in
async fn india(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.news.india().await?))
}

/// GET /news/sources?country&category
async fn sources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourcesQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .news
        .sources(query.country.as_deref(), query.category.as_deref())
        .await?;
    Ok(Json(body))
}

/// GET /news/combined?country&category&q
async fn combined(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HeadlineQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.news.combined(&query).await?))
}

/// GET /news/stocks?feed_url&limit
async fn stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StocksQuery>,
) -> Result<Json<StockFeed>, ApiError> {
    let feed = state
        .news
        .stock_news(query.feed_url.as_deref(), query.limit)
        .await?;
    Ok(Json(feed))
}
