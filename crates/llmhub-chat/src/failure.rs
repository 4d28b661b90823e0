//! Classification of failed provider calls.
//!
//! Adapters keep failures structured; the dispatcher renders them to the
//! user-facing text channel with [`ProviderFailure::user_message`].

use reqwest::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// Upstream rejected the credential (401).
    Unauthorized,
    /// Upstream throttled the request (429).
    RateLimited,
    /// Upstream returned a 5xx status.
    Unavailable { status: u16 },
    /// Any other non-2xx status.
    Upstream { status: u16, body: String },
    /// Timeout, connection refused, TLS failure and the like.
    Transport(String),
    /// 2xx response without a reply where one was expected.
    MalformedResponse,
}

impl ProviderFailure {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => ProviderFailure::Unauthorized,
            429 => ProviderFailure::RateLimited,
            s if s >= 500 => ProviderFailure::Unavailable { status: s },
            s => ProviderFailure::Upstream { status: s, body },
        }
    }

    /// Whether a later retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderFailure::RateLimited
                | ProviderFailure::Unavailable { .. }
                | ProviderFailure::Transport(_)
        )
    }

    /// Presentable explanation sent back in place of a reply.
    pub fn user_message(&self, provider: &str) -> String {
        match self {
            ProviderFailure::Unauthorized => {
                format!("Unauthorized: invalid API key for {}.", provider)
            }
            ProviderFailure::RateLimited => {
                format!("Rate limit exceeded for {}. Try again later.", provider)
            }
            ProviderFailure::Unavailable { status } => {
                format!("{} server error ({}). Try again later.", provider, status)
            }
            ProviderFailure::Upstream { status, body } => {
                format!("{} API error {}: {}", provider, status, body)
            }
            ProviderFailure::Transport(e) => format!("Request failed: {}", e),
            ProviderFailure::MalformedResponse => {
                format!("Unexpected response format from {}.", provider)
            }
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderFailure::Unauthorized => write!(f, "unauthorized"),
            ProviderFailure::RateLimited => write!(f, "rate limited"),
            ProviderFailure::Unavailable { status } => write!(f, "unavailable ({})", status),
            ProviderFailure::Upstream { status, .. } => write!(f, "upstream error ({})", status),
            ProviderFailure::Transport(e) => write!(f, "transport: {}", e),
            ProviderFailure::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ProviderFailure::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ProviderFailure::Unauthorized
        );
        assert_eq!(
            ProviderFailure::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ProviderFailure::RateLimited
        );
        assert_eq!(
            ProviderFailure::from_status(StatusCode::BAD_GATEWAY, String::new()),
            ProviderFailure::Unavailable { status: 502 }
        );
        assert_eq!(
            ProviderFailure::from_status(StatusCode::PAYMENT_REQUIRED, "credits".into()),
            ProviderFailure::Upstream {
                status: 402,
                body: "credits".into()
            }
        );
    }

    #[test]
    fn test_transient() {
        assert!(ProviderFailure::RateLimited.is_transient());
        assert!(ProviderFailure::Transport("reset".into()).is_transient());
        assert!(!ProviderFailure::Unauthorized.is_transient());
        assert!(!ProviderFailure::MalformedResponse.is_transient());
    }

    #[test]
    fn test_upstream_message_includes_status_and_body() {
        let msg = ProviderFailure::Upstream {
            status: 400,
            body: "bad model".into(),
        }
        .user_message("deepseek");
        assert!(msg.contains("400"));
        assert!(msg.contains("bad model"));
    }
}
