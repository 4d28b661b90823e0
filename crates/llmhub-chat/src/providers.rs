//! LLM provider adapters.
//!
//! All three vendors are reached through OpenRouter's chat-completions API
//! and differ only in how they use conversation state:
//! - `StatelessAdapter`: single turn behind a fixed system preamble.
//! - `HistoryAdapter`: carries prior turns, forwards only a bounded tail.
//! - `MultimodalAdapter`: single turn with text and image parts, reply normalized to prose.

use llmhub_core::{Error, ProviderSettings, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::failure::ProviderFailure;
use crate::normalize::normalize_reply;
use crate::types::{ConversationHistory, ProviderId, Turn};

pub const STATELESS_PREAMBLE: &str =
    "You are a helpful assistant. Answer clearly and concisely.";

const HISTORY_TEMPERATURE: f64 = 0.7;
const MULTIMODAL_TEMPERATURE: f64 = 0.7;

/// Result of one adapter call: the reply (or why there is none) and the
/// history to persist.
#[derive(Debug, Clone)]
pub struct Generation {
    pub provider: ProviderId,
    pub outcome: std::result::Result<String, ProviderFailure>,
    pub history: ConversationHistory,
}

impl Generation {
    /// Reply text, with failures rendered as a presentable explanation.
    pub fn reply_text(&self) -> String {
        match &self.outcome {
            Ok(text) => text.clone(),
            Err(failure) => failure.user_message(self.provider.as_str()),
        }
    }
}

/// Connection details shared by every OpenRouter-backed adapter.
struct Upstream {
    provider: ProviderId,
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    limiter: Semaphore,
}

impl Upstream {
    fn new(
        provider: ProviderId,
        client: Client,
        settings: &ProviderSettings,
        api_key: Option<&String>,
        key_var: &str,
        model: &str,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .cloned()
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} API key missing. Set {} in the environment.",
                    provider, key_var
                ))
            })?;

        info!("Provider {} ready (model={})", provider, model);

        Ok(Self {
            provider,
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
            limiter: Semaphore::new(settings.concurrency.max(1)),
        })
    }

    /// One best-effort chat-completions call. No retries.
    async fn complete(
        &self,
        messages: &[Turn],
        temperature: Option<f64>,
    ) -> std::result::Result<String, ProviderFailure> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| ProviderFailure::Transport("provider limiter closed".into()))?;

        let mut body = json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(t) = temperature {
            body["temperature"] = json!(t);
        }

        debug!(
            "Calling {} with model {} ({} messages)",
            self.provider,
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let failure = ProviderFailure::from_status(status, body);
            warn!("{} call failed: {}", self.provider, failure);
            return Err(failure);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|_| ProviderFailure::MalformedResponse)?;

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or(ProviderFailure::MalformedResponse)
    }
}

/// Single-turn provider. Ignores history and images.
pub struct StatelessAdapter {
    upstream: Upstream,
}

impl StatelessAdapter {
    pub fn new(client: Client, settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(
                ProviderId::OpenAI,
                client,
                settings,
                settings.openai_api_key.as_ref(),
                "OPENAI_API_KEY or OPENROUTER_API_KEY",
                &settings.openai_model,
            )?,
        })
    }

    pub async fn generate(&self, message: &str) -> std::result::Result<String, ProviderFailure> {
        let messages = [Turn::system(STATELESS_PREAMBLE), Turn::user(message)];
        self.upstream.complete(&messages, None).await
    }
}

/// Multi-turn provider that carries conversation history across calls.
pub struct HistoryAdapter {
    upstream: Upstream,
    window: usize,
}

impl HistoryAdapter {
    pub fn new(client: Client, settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(
                ProviderId::DeepSeek,
                client,
                settings,
                settings.deepseek_api_key.as_ref(),
                "DEEPSEEK_API_KEY or OPENROUTER_API_KEY",
                &settings.deepseek_model,
            )?,
            window: settings.history_window.max(1),
        })
    }

    /// Most recent turns forwarded upstream.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Append `message` as a user turn, send the last `window` turns, and on
    /// success append the reply to the full history. On failure the history
    /// keeps the user turn and gains nothing else.
    pub async fn generate(&self, message: &str, mut history: ConversationHistory) -> Generation {
        history.push(Turn::user(message));

        let start = history.len().saturating_sub(self.window);
        let outcome = self
            .upstream
            .complete(&history[start..], Some(HISTORY_TEMPERATURE))
            .await;

        if let Ok(reply) = &outcome {
            history.push(Turn::assistant(reply.clone()));
        }

        Generation {
            provider: self.upstream.provider,
            outcome,
            history,
        }
    }
}

/// Single-turn provider accepting image references.
pub struct MultimodalAdapter {
    upstream: Upstream,
    system_prompt: Option<String>,
}

impl MultimodalAdapter {
    pub fn new(client: Client, settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            upstream: Upstream::new(
                ProviderId::Gemini,
                client,
                settings,
                settings.gemini_api_key.as_ref(),
                "GEMINI_API_KEY or OPENROUTER_API_KEY",
                &settings.gemini_model,
            )?,
            system_prompt: settings.gemini_system_prompt.clone(),
        })
    }

    pub async fn generate(
        &self,
        message: &str,
        images: &[String],
    ) -> std::result::Result<String, ProviderFailure> {
        let mut messages = Vec::with_capacity(2);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Turn::system(prompt.clone()));
        }
        messages.push(Turn::user_with_images(message, images));

        let reply = self
            .upstream
            .complete(&messages, Some(MULTIMODAL_TEMPERATURE))
            .await?;
        Ok(normalize_reply(&reply))
    }
}

/// Closed set of LLM adapter variants.
pub enum Adapter {
    Stateless(StatelessAdapter),
    HistoryBearing(HistoryAdapter),
    Multimodal(MultimodalAdapter),
}

impl Adapter {
    pub fn provider(&self) -> ProviderId {
        match self {
            Adapter::Stateless(a) => a.upstream.provider,
            Adapter::HistoryBearing(a) => a.upstream.provider,
            Adapter::Multimodal(a) => a.upstream.provider,
        }
    }

    /// Whether this adapter reads and writes the conversation store.
    pub fn is_history_bearing(&self) -> bool {
        matches!(self, Adapter::HistoryBearing(_))
    }

    /// Uniform entry point. Stateless and multimodal variants return `history`
    /// untouched.
    pub async fn generate(
        &self,
        message: &str,
        history: ConversationHistory,
        images: &[String],
    ) -> Generation {
        let provider = self.provider();
        match self {
            Adapter::HistoryBearing(a) => a.generate(message, history).await,
            Adapter::Stateless(a) => Generation {
                provider,
                outcome: a.generate(message).await,
                history,
            },
            Adapter::Multimodal(a) => Generation {
                provider,
                outcome: a.generate(message, images).await,
                history,
            },
        }
    }
}
