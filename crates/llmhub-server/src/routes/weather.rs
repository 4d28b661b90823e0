//! Weather routes: resolved through the weather cache.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use llmhub_weather::client::fallback_text;
use llmhub_weather::Units;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather/current", get(current))
        .route("/weather/forecast", get(forecast))
        .route("/weather/combined", get(combined))
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    city: String,
    #[serde(default)]
    units: Units,
}

/// `/weather/current` accepts anything and reports problems in the fallback body.
#[derive(Debug, Deserialize)]
struct CurrentQuery {
    city: Option<String>,
    units: Option<String>,
}

/// GET /weather/current: degrades to `{ text, error }` instead of failing.
async fn current(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CurrentQuery>,
) -> Json<Value> {
    let Some(city) = query.city.filter(|c| !c.trim().is_empty()) else {
        return Json(json!({
            "text": "Please provide a city, e.g. 'Delhi,IN'.",
            "error": "missing 'city' query parameter",
        }));
    };
    let units = match query.units.as_deref().map(str::parse::<Units>) {
        Some(Ok(units)) => units,
        Some(Err(e)) => {
            warn!("{}; using {}", e, Units::default());
            Units::default()
        }
        None => Units::default(),
    };

    match state.weather.current(&city, units).await {
        Ok(payload) => Json(payload),
        Err(e) => {
            warn!("Current weather for {:?} failed: {}", city, e);
            Json(json!({
                "text": fallback_text(&city, &e),
                "error": e.to_string(),
            }))
        }
    }
}

/// GET /weather/forecast: 400 with the error description on failure.
async fn forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, ApiError> {
    state
        .weather
        .forecast(&query.city, query.units)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))
}

/// GET /weather/combined: `{ current, forecast }`, 400 on the first failure.
async fn combined(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, ApiError> {
    let current = state
        .weather
        .current(&query.city, query.units)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;
    let forecast = state
        .weather
        .forecast(&query.city, query.units)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(json!({
        "current": current,
        "forecast": forecast,
    })))
}
