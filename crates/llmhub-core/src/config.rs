//! Gateway configuration read from the process environment.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "openai/gpt-oss-120b:free";
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek/deepseek-chat-v3.1:free";
pub const DEFAULT_GEMINI_MODEL: &str = "google/gemini-2.5-flash-image-preview:free";
pub const DEFAULT_HISTORY_WINDOW: usize = 4;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_PROVIDER_CONCURRENCY: usize = 4;
pub const DEFAULT_NEWS_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_STOCK_FEED_URL: &str =
    "https://feeds.finance.yahoo.com/rss/2.0/headline?s=%5EGSPC&region=US&lang=en-US";
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

/// Settings shared by the LLM provider adapters.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSettings {
    /// OpenRouter-compatible API root (`.../api/v1`).
    pub base_url: String,
    #[serde(skip)]
    pub openai_api_key: Option<String>,
    #[serde(skip)]
    pub deepseek_api_key: Option<String>,
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
    pub openai_model: String,
    pub deepseek_model: String,
    pub gemini_model: String,
    pub gemini_system_prompt: Option<String>,
    /// Most recent turns forwarded upstream by history-bearing adapters.
    pub history_window: usize,
    /// Upper bound on `(session, provider)` histories kept in memory.
    pub max_sessions: usize,
    /// In-flight upstream calls allowed per provider.
    pub concurrency: usize,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsSettings {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub stock_feed_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherSettings {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    /// Lifetime of cached current/forecast payloads. Geocode results never expire.
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
}

/// Top-level llmhub configuration.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayConfig {
    /// HTTP server port.
    pub port: u16,
    /// Allowed CORS origin; `None` means permissive.
    pub cors_allow_origin: Option<String>,
    pub providers: ProviderSettings,
    pub news: NewsSettings,
    pub weather: WeatherSettings,
}

impl GatewayConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .filter_map(|k| lookup(k))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        let parse_or = |key: &str, default: u64| -> u64 {
            match get(&[key]).map(|v| v.parse::<u64>().map_err(|_| v)) {
                Some(Ok(n)) => n,
                Some(Err(raw)) => {
                    warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                    default
                }
                None => default,
            }
        };

        let providers = ProviderSettings {
            base_url: get(&["OPENROUTER_BASE_URL"])
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.into()),
            openai_api_key: get(&["OPENAI_API_KEY", "OPENROUTER_API_KEY"]),
            deepseek_api_key: get(&["DEEPSEEK_API_KEY", "OPENROUTER_API_KEY"]),
            gemini_api_key: get(&["GEMINI_API_KEY", "OPENROUTER_API_KEY"]),
            openai_model: get(&["OPENAI_MODEL"]).unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            deepseek_model: get(&["DEEPSEEK_MODEL"])
                .unwrap_or_else(|| DEFAULT_DEEPSEEK_MODEL.into()),
            gemini_model: get(&["GEMINI_MODEL"]).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_system_prompt: get(&["GEMINI_SYSTEM_PROMPT"]),
            history_window: parse_or("HISTORY_WINDOW", DEFAULT_HISTORY_WINDOW as u64).max(1)
                as usize,
            max_sessions: parse_or("MAX_SESSIONS", DEFAULT_MAX_SESSIONS as u64).max(1) as usize,
            concurrency: parse_or("PROVIDER_CONCURRENCY", DEFAULT_PROVIDER_CONCURRENCY as u64)
                .max(1) as usize,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)),
        };

        let news = NewsSettings {
            api_key: get(&["NEWS_API_KEY", "NEWSAPI_KEY"]),
            base_url: get(&["NEWS_BASE_URL"]).unwrap_or_else(|| DEFAULT_NEWS_BASE_URL.into()),
            stock_feed_url: get(&["STOCK_NEWS_FEED_URL"])
                .unwrap_or_else(|| DEFAULT_STOCK_FEED_URL.into()),
        };

        let weather = WeatherSettings {
            api_key: get(&["OPENWEATHER_KEY", "OPENWEATHER_API_KEY"]),
            base_url: get(&["OPENWEATHER_BASE_URL"])
                .unwrap_or_else(|| DEFAULT_OPENWEATHER_BASE_URL.into()),
            cache_ttl: Duration::from_secs(parse_or("WEATHER_CACHE_TTL_SECS", 600)),
            cache_capacity: parse_or("WEATHER_CACHE_CAPACITY", 256).max(1) as usize,
        };

        Self {
            port: u16::try_from(parse_or("PORT", DEFAULT_PORT as u64)).unwrap_or(DEFAULT_PORT),
            cors_allow_origin: get(&["CORS_ALLOW_ORIGIN"]),
            providers,
            news,
            weather,
        }
    }
}
