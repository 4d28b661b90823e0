//! News and market data lookups.
//!
//! Thin wrappers over NewsAPI (`/top-headlines`, `/top-headlines/sources`)
//! and an RSS reader for stock-market news feeds. Also provides the headline
//! digest served through the chat interface by the `news` pseudo-provider.

pub mod client;
pub mod feed;
pub mod types;

pub use client::NewsClient;
pub use types::*;
