//! Dispatcher: routes chat requests to adapters and owns session history.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use llmhub_core::{Error, ProviderSettings, Result};
use llmhub_news::NewsClient;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::providers::{Adapter, HistoryAdapter, MultimodalAdapter, StatelessAdapter};
use crate::store::ConversationStore;
use crate::types::{ChatRequest, ChatResponse, ProviderId};

/// What a provider identifier is routed to.
pub enum Route {
    Llm(Adapter),
    /// Pseudo-provider answering from a data source rather than a model.
    News(Arc<NewsClient>),
}

/// Orchestration entry point for `POST /chat`.
pub struct Dispatcher {
    routes: BTreeMap<ProviderId, Route>,
    store: ConversationStore,
}

impl Dispatcher {
    /// Empty dispatcher; register routes with `with_adapter` / `with_news`.
    pub fn new(store: ConversationStore) -> Self {
        Self {
            routes: BTreeMap::new(),
            store,
        }
    }

    /// Build every adapter from configuration. Fails on the first missing credential.
    pub fn from_settings(settings: &ProviderSettings, news: Arc<NewsClient>) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        let dispatcher = Self::new(ConversationStore::new(settings.max_sessions))
            .with_adapter(Adapter::Stateless(StatelessAdapter::new(client.clone(), settings)?))
            .with_adapter(Adapter::Multimodal(MultimodalAdapter::new(client.clone(), settings)?))
            .with_adapter(Adapter::HistoryBearing(HistoryAdapter::new(client, settings)?))
            .with_news(news);

        info!("Dispatcher ready: providers={:?}", dispatcher.providers());
        Ok(dispatcher)
    }

    pub fn with_adapter(mut self, adapter: Adapter) -> Self {
        self.routes.insert(adapter.provider(), Route::Llm(adapter));
        self
    }

    pub fn with_news(mut self, news: Arc<NewsClient>) -> Self {
        self.routes.insert(ProviderId::News, Route::News(news));
        self
    }

    /// Registered provider identifiers in stable order.
    pub fn providers(&self) -> Vec<String> {
        self.routes.keys().map(|p| p.to_string()).collect()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Handle one chat request for `session_id`.
    ///
    /// Unknown or unregistered providers yield `Error::UnsupportedProvider`
    /// without touching any history. Upstream failures come back as normal
    /// replies; a panic inside dispatch is caught and reported as `Error::Internal`.
    pub async fn handle(&self, session_id: &str, request: &ChatRequest) -> Result<ChatResponse> {
        let provider: ProviderId = request.provider.parse()?;
        let route = self
            .routes
            .get(&provider)
            .ok_or_else(|| Error::UnsupportedProvider(request.provider.clone()))?;

        debug!("Dispatching session={} provider={}", session_id, provider);

        match AssertUnwindSafe(self.dispatch(session_id, provider, route, request))
            .catch_unwind()
            .await
        {
            Ok(response) => response,
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                error!("Dispatch to {} panicked: {}", provider, msg);
                Err(Error::Internal(msg))
            }
        }
    }

    async fn dispatch(
        &self,
        session_id: &str,
        provider: ProviderId,
        route: &Route,
        request: &ChatRequest,
    ) -> Result<ChatResponse> {
        match route {
            Route::News(news) => Ok(ChatResponse {
                response: news.headline_digest().await,
                provider: news.source_label().to_string(),
            }),
            Route::Llm(adapter) if adapter.is_history_bearing() => {
                // Held across the upstream call: one writer per (session, provider)
                let mut history = self.store.lock(session_id, provider).await;
                let generation = adapter
                    .generate(&request.message, history.clone(), &request.images)
                    .await;
                let response = generation.reply_text();
                *history = generation.history;
                Ok(ChatResponse {
                    response,
                    provider: provider.to_string(),
                })
            }
            Route::Llm(adapter) => {
                let generation = adapter
                    .generate(&request.message, Vec::new(), &request.images)
                    .await;
                Ok(ChatResponse {
                    response: generation.reply_text(),
                    provider: provider.to_string(),
                })
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}
