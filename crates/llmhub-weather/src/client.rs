//! OpenWeather client with geocode, current and forecast caches.

use llmhub_core::WeatherSettings;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::aliases::{city_part, normalize_query};
use crate::cache::TtlCache;
use crate::types::*;

const GEOCODE_CANDIDATES: u32 = 5;

/// Which payload cache/endpoint a lookup targets.
#[derive(Debug, Clone, Copy)]
enum Report {
    Current,
    Forecast,
}

impl Report {
    fn path(&self) -> &'static str {
        match self {
            Report::Current => "data/2.5/weather",
            Report::Forecast => "data/2.5/forecast",
        }
    }
}

/// Weather lookups with private, per-instance caches.
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    geocode_cache: TtlCache<GeoLocation>,
    current_cache: TtlCache<Value>,
    forecast_cache: TtlCache<Value>,
}

impl WeatherClient {
    pub fn new(client: Client, settings: &WeatherSettings) -> Self {
        if settings.api_key.is_none() {
            info!("OpenWeather key not configured; weather lookups will fail");
        }
        let ttl = Some(settings.cache_ttl).filter(|t| !t.is_zero());
        Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            geocode_cache: TtlCache::new(settings.cache_capacity, None),
            current_cache: TtlCache::new(settings.cache_capacity, ttl),
            forecast_cache: TtlCache::new(settings.cache_capacity, ttl),
        }
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingKey)
    }

    /// Resolve a free-text city (optionally `City,CountryCode`) to coordinates.
    ///
    /// Results are cached by the normalized query string. Among the returned
    /// candidates an exact case-insensitive name match wins, else the first.
    pub async fn geocode(&self, query: &str) -> Result<GeoLocation, WeatherError> {
        let api_key = self.api_key()?;
        let normalized = normalize_query(query);

        if let Some(loc) = self.geocode_cache.get(&normalized) {
            return Ok(loc);
        }

        debug!("Geocoding '{}'", normalized);
        let limit = GEOCODE_CANDIDATES.to_string();
        let response = self
            .client
            .get(format!("{}/geo/1.0/direct", self.base_url))
            .query(&[
                ("q", normalized.as_str()),
                ("limit", limit.as_str()),
                ("appid", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let candidates: Vec<GeoCandidate> = response
            .json::<Option<Vec<GeoCandidate>>>()
            .await?
            .unwrap_or_default();
        let wanted = city_part(&normalized);
        let exact = candidates.iter().position(|c| {
            c.name
                .as_deref()
                .is_some_and(|name| name.to_lowercase() == wanted)
        });
        let chosen = match exact {
            Some(idx) => candidates.into_iter().nth(idx),
            None => candidates.into_iter().next(),
        };

        let loc = chosen
            .ok_or_else(|| WeatherError::NotFound(normalized.clone()))?
            .into_location();
        self.geocode_cache.put(normalized, loc.clone());
        Ok(loc)
    }

    /// Current conditions for a city, with `resolved_name` injected.
    pub async fn current(&self, city: &str, units: Units) -> Result<Value, WeatherError> {
        self.report(Report::Current, city, units).await
    }

    /// Five-day / three-hour forecast for a city, with `resolved_name` injected.
    pub async fn forecast(&self, city: &str, units: Units) -> Result<Value, WeatherError> {
        self.report(Report::Forecast, city, units).await
    }

    /// Concise human-readable summary of current conditions. Never fails.
    pub async fn current_text(&self, city: &str, units: Units) -> String {
        match self.current(city, units).await {
            Ok(payload) => summarize(&payload, city, units)
                .unwrap_or_else(|| format!("Could not read weather for {}.", city)),
            Err(e) => fallback_text(city, &e),
        }
    }

    async fn report(
        &self,
        report: Report,
        city: &str,
        units: Units,
    ) -> Result<Value, WeatherError> {
        let api_key = self.api_key()?;
        let loc = self.geocode(city).await?;
        let key = loc.cache_key(units);
        let cache = match report {
            Report::Current => &self.current_cache,
            Report::Forecast => &self.forecast_cache,
        };

        // Hits still carry the freshly resolved display name
        if let Some(mut payload) = cache.get(&key) {
            inject_resolved_name(&mut payload, &loc.display);
            return Ok(payload);
        }

        debug!("Fetching {:?} for {}", report, key);
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, report.path()))
            .query(&[
                ("lat", loc.lat.to_string()),
                ("lon", loc.lon.to_string()),
                ("appid", api_key.to_string()),
                ("units", units.as_str().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let mut payload: Value = response.json().await?;
        cache.put(key, payload.clone());
        inject_resolved_name(&mut payload, &loc.display);
        Ok(payload)
    }
}

fn inject_resolved_name(payload: &mut Value, display: &str) {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("resolved_name".into(), Value::String(display.to_string()));
    }
}

/// `"Weather in <name>: <temp><symbol>, <Description>"` from a current-conditions payload.
pub fn summarize(payload: &Value, city: &str, units: Units) -> Option<String> {
    let temp = payload["main"]["temp"].as_f64()?;
    let desc = payload["weather"][0]["description"].as_str()?;
    let name = payload["resolved_name"]
        .as_str()
        .filter(|n| !n.is_empty())
        .unwrap_or(city);
    Some(format!(
        "Weather in {}: {}{}, {}",
        name,
        temp,
        units.temperature_symbol(),
        capitalize(desc)
    ))
}

/// Text shown in place of structured data when a lookup fails.
pub fn fallback_text(city: &str, err: &WeatherError) -> String {
    match err {
        WeatherError::MissingKey | WeatherError::NotFound(_) => err.to_string(),
        _ => format!(
            "Could not fetch weather for {}. Try 'City,CountryCode' (e.g., 'Delhi,IN').",
            city.trim()
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
