//! RSS 2.0 parsing for stock-news feeds.

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::types::{NewsError, StockItem};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Parse an RSS document into at most `limit` items. Items without a title are skipped.
pub fn parse_rss(xml: &str, limit: usize) -> Result<Vec<StockItem>, NewsError> {
    let rss: Rss = from_str(xml).map_err(|e| NewsError::Feed(e.to_string()))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let title = item.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            Some(StockItem {
                title,
                link: item.link.unwrap_or_default().trim().to_string(),
                published: item.pub_date.map(|d| d.trim().to_string()),
            })
        })
        .take(limit)
        .collect())
}
