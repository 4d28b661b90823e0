//! News request and response types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Missing NEWS_API_KEY. Set it in the environment and restart.")]
    MissingKey,

    #[error("HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("API status: {0}")]
    Api(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Request error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(e: reqwest::Error) -> Self {
        NewsError::Transport(e.to_string())
    }
}

/// Parameters for a `/top-headlines` lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadlineQuery {
    pub country: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, rename = "pageSize")]
    pub page_size: Option<usize>,
}

impl HeadlineQuery {
    pub fn country(code: &str) -> Self {
        Self {
            country: Some(code.to_string()),
            ..Default::default()
        }
    }

    /// NewsAPI rejects a headline query with no filter at all.
    pub fn has_filter(&self) -> bool {
        self.country.is_some() || self.category.is_some() || self.q.is_some()
    }
}

/// One entry of a stock-news RSS feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockItem {
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockFeed {
    pub feed_url: String,
    pub items: Vec<StockItem>,
}
