//! Weather resolution cache.
//!
//! Resolves free-text locations to coordinates through OpenWeather's geocoding
//! API (with a small alias table for informal names), then serves current and
//! forecast payloads keyed by `"<lat>,<lon>:<units>"`. Each `WeatherClient`
//! owns three private caches: geocode, current and forecast.

pub mod aliases;
pub mod cache;
pub mod client;
pub mod types;

pub use cache::TtlCache;
pub use client::WeatherClient;
pub use types::*;
