//! llmhub core: error taxonomy and environment-driven configuration.

pub mod config;
pub mod error;

pub use config::{GatewayConfig, NewsSettings, ProviderSettings, WeatherSettings};
pub use error::{Error, Result};
