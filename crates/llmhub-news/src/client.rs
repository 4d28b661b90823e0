//! NewsAPI and RSS feed client.

use llmhub_core::NewsSettings;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::feed::parse_rss;
use crate::types::*;

/// Provider label reported when headlines are served through the chat endpoint.
pub const SOURCE_LABEL: &str = "newsapi";

const DEFAULT_PAGE_SIZE: usize = 20;
const DIGEST_SIZE: usize = 5;
pub const DEFAULT_STOCK_LIMIT: usize = 15;
pub const MAX_STOCK_LIMIT: usize = 50;

/// Stateless client for headline, source and stock-feed lookups.
pub struct NewsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    stock_feed_url: String,
}

impl NewsClient {
    pub fn new(client: Client, settings: &NewsSettings) -> Self {
        Self {
            client,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            stock_feed_url: settings.stock_feed_url.clone(),
        }
    }

    pub fn source_label(&self) -> &'static str {
        SOURCE_LABEL
    }

    fn api_key(&self) -> Result<&str, NewsError> {
        self.api_key.as_deref().ok_or(NewsError::MissingKey)
    }

    /// GET /top-headlines, returning the upstream body unchanged.
    pub async fn top_headlines(&self, query: &HeadlineQuery) -> Result<Value, NewsError> {
        let api_key = self.api_key()?;
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

        let mut params: Vec<(&str, String)> = vec![
            ("apiKey", api_key.to_string()),
            ("pageSize", page_size.to_string()),
        ];
        if let Some(country) = &query.country {
            params.push(("country", country.clone()));
        }
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(q) = &query.q {
            params.push(("q", q.clone()));
        }
        if let Some(language) = &query.language {
            params.push(("language", language.clone()));
        }
        if !query.has_filter() {
            params.push(("category", "general".to_string()));
        }

        self.get_json(&format!("{}/top-headlines", self.base_url), &params)
            .await
    }

    /// Worldwide English-language headlines.
    pub async fn global(&self) -> Result<Value, NewsError> {
        self.top_headlines(&HeadlineQuery {
            category: Some("general".into()),
            language: Some("en".into()),
            ..Default::default()
        })
        .await
    }

    /// Indian headlines.
    pub async fn india(&self) -> Result<Value, NewsError> {
        self.top_headlines(&HeadlineQuery::country("in")).await
    }

    /// GET /top-headlines/sources, optionally narrowed by country and category.
    pub async fn sources(
        &self,
        country: Option<&str>,
        category: Option<&str>,
    ) -> Result<Value, NewsError> {
        let api_key = self.api_key()?;
        let mut params: Vec<(&str, String)> = vec![("apiKey", api_key.to_string())];
        if let Some(country) = country {
            params.push(("country", country.to_string()));
        }
        if let Some(category) = category {
            params.push(("category", category.to_string()));
        }

        self.get_json(&format!("{}/top-headlines/sources", self.base_url), &params)
            .await
    }

    /// Headlines and sources fetched concurrently: `{ "headlines": .., "sources": .. }`.
    pub async fn combined(&self, query: &HeadlineQuery) -> Result<Value, NewsError> {
        let (headlines, sources) = tokio::join!(
            self.top_headlines(query),
            self.sources(query.country.as_deref(), query.category.as_deref()),
        );
        Ok(json!({
            "headlines": headlines?,
            "sources": sources?,
        }))
    }

    /// Read a stock-news RSS feed. Falls back to the configured feed URL.
    pub async fn stock_news(
        &self,
        feed_url: Option<&str>,
        limit: Option<usize>,
    ) -> Result<StockFeed, NewsError> {
        let feed_url = feed_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.stock_feed_url)
            .to_string();
        let limit = limit.unwrap_or(DEFAULT_STOCK_LIMIT).clamp(1, MAX_STOCK_LIMIT);

        debug!("Fetching stock feed {}", feed_url);
        let response = self.client.get(&feed_url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let items = parse_rss(&body, limit)?;
        Ok(StockFeed { feed_url, items })
    }

    /// Short text digest of US headlines for the chat interface. Never fails.
    pub async fn headline_digest(&self) -> String {
        let query = HeadlineQuery {
            country: Some("us".into()),
            page_size: Some(DIGEST_SIZE),
            ..Default::default()
        };

        match self.top_headlines(&query).await {
            Ok(body) => {
                let titles: Vec<&str> = body["articles"]
                    .as_array()
                    .map(|a| a.iter().filter_map(|x| x["title"].as_str()).collect())
                    .unwrap_or_default();
                if titles.is_empty() {
                    return "No headlines available right now.".to_string();
                }
                let lines: Vec<String> = titles
                    .iter()
                    .take(DIGEST_SIZE)
                    .map(|t| format!("• {}", t))
                    .collect();
                format!("Latest headlines:\n{}", lines.join("\n"))
            }
            Err(e) => {
                warn!("Headline digest failed: {}", e);
                format!("Unable to fetch news: {}", e)
            }
        }
    }

    async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value, NewsError> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        match data["status"].as_str() {
            Some("ok") => Ok(data),
            other => Err(NewsError::Api(format!(
                "{} details: {}",
                other.unwrap_or("missing"),
                data
            ))),
        }
    }
}
