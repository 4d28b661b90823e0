//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use llmhub_chat::Dispatcher;
use llmhub_core::{Error, GatewayConfig, Result};
use llmhub_news::NewsClient;
use llmhub_weather::WeatherClient;
use reqwest::Client;

/// Timeout for the news and weather data APIs.
const DATA_API_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: GatewayConfig,
    pub dispatcher: Dispatcher,
    pub news: Arc<NewsClient>,
    pub weather: WeatherClient,
}

impl AppState {
    /// Build all components. Fails fast when an LLM credential is missing.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let data_client = Client::builder()
            .timeout(DATA_API_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        let news = Arc::new(NewsClient::new(data_client.clone(), &config.news));
        let weather = WeatherClient::new(data_client, &config.weather);
        let dispatcher = Dispatcher::from_settings(&config.providers, news.clone())?;

        Ok(Self::from_parts(config, dispatcher, news, weather))
    }

    /// Assemble state from prebuilt components.
    pub fn from_parts(
        config: GatewayConfig,
        dispatcher: Dispatcher,
        news: Arc<NewsClient>,
        weather: WeatherClient,
    ) -> Self {
        Self {
            config,
            dispatcher,
            news,
            weather,
        }
    }
}
