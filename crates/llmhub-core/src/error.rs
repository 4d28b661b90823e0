//! Error types for llmhub.
//!
//! Upstream and transport failures of individual lookups are typed where they
//! occur (`ProviderFailure`, `WeatherError`, `NewsError`); this enum covers the
//! conditions that abort a request or startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A required credential or setting is absent. Never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider '{0}' not supported")]
    UnsupportedProvider(String),

    /// A fault caught at the dispatch boundary.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the failure is caused by the caller rather than the gateway.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::UnsupportedProvider(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_provider() {
        let err = Error::UnsupportedProvider("claude".into());
        assert_eq!(err.to_string(), "Provider 'claude' not supported");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::UnsupportedProvider("unknown".into()).is_client_error());
        assert!(!Error::Internal("boom".into()).is_client_error());
        assert!(!Error::Config("missing key".into()).is_client_error());
    }
}
