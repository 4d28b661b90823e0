//! Weather types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum WeatherError {
    #[error("Missing OPENWEATHER_KEY in environment")]
    MissingKey,

    #[error("Could not find location '{0}'. Try 'City,CountryCode' (e.g., 'Delhi,IN').")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A 2xx response whose body does not have the expected shape.
    #[error("Unexpected response from weather service: {0}")]
    Malformed(String),

    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WeatherError::Malformed(e.to_string())
        } else {
            WeatherError::Transport(e.to_string())
        }
    }
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
    /// `"Name, State, Country"` with empty parts omitted.
    pub display: String,
}

impl GeoLocation {
    /// Cache key shared by the current and forecast caches.
    pub fn cache_key(&self, units: Units) -> String {
        format!("{},{}:{}", self.lat, self.lon, units.as_str())
    }
}

/// Candidate returned by the geocoding endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeoCandidate {
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl GeoCandidate {
    pub(crate) fn into_location(self) -> GeoLocation {
        let display = [self.name, self.state, self.country]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        GeoLocation {
            lat: self.lat,
            lon: self.lon,
            display,
        }
    }
}

/// Measurement system requested from the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            other => Err(format!("unknown units '{}'", other)),
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_skips_missing_parts() {
        let candidate = GeoCandidate {
            name: Some("Delhi".into()),
            lat: 28.65,
            lon: 77.23,
            country: Some("IN".into()),
            state: None,
        };
        assert_eq!(candidate.into_location().display, "Delhi, IN");
    }

    #[test]
    fn test_cache_key_format() {
        let loc = GeoLocation {
            lat: 28.65,
            lon: 77.23,
            display: "Delhi, IN".into(),
        };
        assert_eq!(loc.cache_key(Units::Imperial), "28.65,77.23:imperial");
    }

    #[test]
    fn test_units_parse_lowercase() {
        let units: Units = serde_json::from_str("\"imperial\"").unwrap();
        assert_eq!(units, Units::Imperial);
        assert_eq!(units.temperature_symbol(), "°F");
        assert_eq!(" Standard ".parse::<Units>(), Ok(Units::Standard));
        assert!("kelvin".parse::<Units>().is_err());
    }
}
