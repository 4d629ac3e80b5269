//! Crate-wide error hierarchy for git-context-engine.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type GitContextEngineResult<T> = Result<T, GitContextEngineError>;

/// Root error type for the git-context-engine crate.
#[derive(Debug, Error)]
pub enum GitContextEngineError {
    /// GitHub REST failure.
    #[error(transparent)]
    Provider(#[from] GitContextEngineProviderError),

    /// OAuth code exchange failure.
    #[error(transparent)]
    OAuth(#[from] GitContextEngineOAuthError),

    /// Input validation errors (bad paths, unexpected resource kinds, etc.).
    #[error("validation error: {0}")]
    Validation(String),
}

impl GitContextEngineError {
    /// True for a GitHub 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GitContextEngineError::Provider(GitContextEngineProviderError::NotFound)
        )
    }
}

/// Provider-specific error used inside the provider layer.
#[derive(Debug, Error)]
pub enum GitContextEngineProviderError {
    /// Unauthorized (HTTP 401): missing, invalid or expired token.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403) without rate-limit signals.
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429, or 403 with exhausted quota).
    #[error("rate limited")]
    RateLimited {
        /// Optional `Retry-After` hint in seconds when available.
        retry_after_secs: Option<u64>,
    },

    /// Gateway / server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (non-2xx) not covered by specific variants.
    #[error("http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// OAuth token exchange errors.
#[derive(Debug, Error)]
pub enum GitContextEngineOAuthError {
    /// GitHub answered with an `error` field (bad or expired code, etc.).
    #[error("oauth exchange rejected: {error}")]
    Rejected {
        error: String,
        description: Option<String>,
    },

    /// GitHub answered without an `access_token`.
    #[error("oauth exchange returned no access token")]
    MissingAccessToken,
}

// ===== Conversions for `?` ergonomics at the crate root =====

impl From<reqwest::Error> for GitContextEngineError {
    fn from(e: reqwest::Error) -> Self {
        GitContextEngineError::Provider(GitContextEngineProviderError::from(e))
    }
}

// ===== Mapping from reqwest::Error into GitContextEngineProviderError =====

impl From<reqwest::Error> for GitContextEngineProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GitContextEngineProviderError::Timeout;
        }

        if let Some(status) = e.status() {
            return GitContextEngineProviderError::from_status(status.as_u16(), None);
        }

        if e.is_decode() {
            return GitContextEngineProviderError::InvalidResponse(e.to_string());
        }

        GitContextEngineProviderError::Network(e.to_string())
    }
}

impl GitContextEngineProviderError {
    /// Maps a non-2xx status into a provider error.
    ///
    /// `rate_limited` carries the rate-limit verdict derived from response
    /// headers; `None` means the headers carried no rate-limit signal.
    pub fn from_status(code: u16, rate_limited: Option<Option<u64>>) -> Self {
        if let Some(retry_after_secs) = rate_limited {
            return GitContextEngineProviderError::RateLimited { retry_after_secs };
        }
        match code {
            401 => GitContextEngineProviderError::Unauthorized,
            403 => GitContextEngineProviderError::Forbidden,
            404 => GitContextEngineProviderError::NotFound,
            429 => GitContextEngineProviderError::RateLimited {
                retry_after_secs: None,
            },
            500..=599 => GitContextEngineProviderError::Server(code),
            _ => GitContextEngineProviderError::HttpStatus(code),
        }
    }
}
