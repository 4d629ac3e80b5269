use axum::{
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use fix_applicator::FixError;
use git_context_engine::{
    GitContextEngineError, GitContextEngineOAuthError, GitContextEngineProviderError,
};
use pr_reviewer::ReviewError;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::{config::ConfigError, http::response_envelope::ErrorBody};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("startup failed: {0}")]
    Startup(String),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    // --- Upstream ---
    #[error("GitHub rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("{0}")]
    UpstreamTimeout(String),

    #[error("{message}")]
    Upstream {
        message: String,
        details: Option<String>,
    },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream { .. }
            | AppError::Config(_)
            | AppError::Startup(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            AppError::BadRequest { details, .. } | AppError::Upstream { details, .. } => {
                details.clone()
            }
            AppError::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(format!("retry after {secs}s")),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }

        let retry_after = match &self {
            AppError::RateLimited {
                retry_after_secs: Some(secs),
            } => HeaderValue::from_str(&secs.to_string()).ok(),
            _ => None,
        };

        let message = match &self {
            AppError::Config(_) | AppError::Startup(_) | AppError::Bind(_) | AppError::Server(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let mut res = ErrorBody::new(message, self.details()).into_response_with_status(status);
        if let Some(v) = retry_after {
            res.headers_mut().insert(RETRY_AFTER, v);
        }
        res
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest {
            message: "Invalid JSON body".into(),
            details: Some(err.body_text()),
        }
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest {
            message: "Invalid query parameters".into(),
            details: Some(err.body_text()),
        }
    }
}

impl From<GitContextEngineError> for AppError {
    fn from(err: GitContextEngineError) -> Self {
        use GitContextEngineProviderError as P;
        match err {
            GitContextEngineError::Provider(p) => match p {
                P::Unauthorized => AppError::Unauthorized("Invalid or expired GitHub token".into()),
                P::Forbidden => AppError::Forbidden("GitHub denied access to this resource".into()),
                P::NotFound => AppError::NotFound("Resource not found on GitHub".into()),
                P::RateLimited { retry_after_secs } => AppError::RateLimited { retry_after_secs },
                P::Timeout => AppError::UpstreamTimeout("GitHub did not respond in time".into()),
                other => {
                    error!(error = %other, "GitHub request failed");
                    let details = match other {
                        P::Server(code) | P::HttpStatus(code) => {
                            Some(format!("upstream status {code}"))
                        }
                        _ => None,
                    };
                    AppError::Upstream {
                        message: "GitHub request failed".into(),
                        details,
                    }
                }
            },
            GitContextEngineError::OAuth(GitContextEngineOAuthError::Rejected {
                error,
                description,
            }) => AppError::BadRequest {
                message: format!("GitHub rejected the authorization code: {error}"),
                details: description,
            },
            GitContextEngineError::OAuth(GitContextEngineOAuthError::MissingAccessToken) => {
                AppError::bad_request("GitHub returned no access token")
            }
            GitContextEngineError::Validation(msg) => AppError::bad_request(msg),
        }
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        if err.is_timeout() {
            return AppError::UpstreamTimeout("AI analysis timed out".into());
        }
        error!(error = %err, "AI analysis failed");
        AppError::Upstream {
            message: "AI analysis failed".into(),
            details: None,
        }
    }
}

impl From<FixError> for AppError {
    fn from(err: FixError) -> Self {
        match err {
            FixError::InvalidPath(msg) => AppError::bad_request(msg),
            e @ FixError::MissingPullNumber => AppError::bad_request(e.to_string()),
            e @ FixError::NoChanges => AppError::bad_request(e.to_string()),
            FixError::NotFound(msg) => AppError::NotFound(msg),
            FixError::PermissionDenied(msg) => AppError::Forbidden(msg),
            FixError::AuthenticationFailed(msg) => AppError::Unauthorized(msg),
            e @ FixError::Timeout { .. } => AppError::UpstreamTimeout(e.to_string()),
            FixError::GitHub(e) => e.into(),
            e @ (FixError::Upstream(_) | FixError::Io(_)) => {
                error!(error = %e, "fix application failed");
                AppError::Upstream {
                    message: "Failed to apply fix".into(),
                    details: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_statuses() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (AppError::bad_request("x"), StatusCode::BAD_REQUEST),
            (
                GitContextEngineError::from(GitContextEngineProviderError::Unauthorized).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                GitContextEngineError::from(GitContextEngineProviderError::NotFound).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                GitContextEngineError::from(GitContextEngineProviderError::RateLimited {
                    retry_after_secs: Some(5),
                })
                .into(),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                GitContextEngineError::from(GitContextEngineProviderError::Timeout).into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                GitContextEngineError::from(GitContextEngineProviderError::Server(502)).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (FixError::PermissionDenied("p".into()).into(), StatusCode::FORBIDDEN),
            (FixError::AuthenticationFailed("a".into()).into(), StatusCode::UNAUTHORIZED),
            (FixError::NotFound("n".into()).into(), StatusCode::NOT_FOUND),
            (FixError::NoChanges.into(), StatusCode::BAD_REQUEST),
            (
                FixError::Timeout {
                    step: "push".into(),
                    secs: 1,
                }
                .into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (FixError::Upstream("u".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[tokio::test]
    async fn body_has_error_and_details() {
        let res = AppError::BadRequest {
            message: "Missing required fields".into(),
            details: Some("filePath".into()),
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], "Missing required fields");
        assert_eq!(v["details"], "filePath");
    }

    async fn body_text(err: AppError) -> String {
        let res = err.into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn model_failures_hide_provider_reply() {
        use ai_llm_service::{
            AiLlmError, LlmProvider,
            error_handler::{HttpError, ProviderError, ProviderErrorKind},
        };

        let err = ReviewError::Model(AiLlmError::Provider(ProviderError::new(
            LlmProvider::Groq,
            ProviderErrorKind::HttpStatus(HttpError {
                status: reqwest::StatusCode::UNAUTHORIZED,
                url: "https://api.groq.com/openai/v1/chat/completions".into(),
                snippet: r#"{"error":{"message":"Invalid API Key gsk_live_SECRETPART"}}"#.into(),
            }),
        )));
        let body = body_text(err.into()).await;
        assert!(body.contains("AI analysis failed"), "{body}");
        assert!(!body.contains("SECRETPART"), "{body}");
        assert!(!body.contains("api.groq.com"), "{body}");
    }

    #[tokio::test]
    async fn github_transport_failures_hide_urls() {
        let err = GitContextEngineError::from(GitContextEngineProviderError::Network(
            "error sending request for url (https://internal-ghe.corp/api/v3/user)".into(),
        ));
        let body = body_text(err.into()).await;
        assert!(body.contains("GitHub request failed"), "{body}");
        assert!(!body.contains("internal-ghe.corp"), "{body}");

        let err = GitContextEngineError::from(GitContextEngineProviderError::Server(502));
        let v: serde_json::Value = serde_json::from_str(&body_text(err.into()).await).unwrap();
        assert_eq!(v["details"], "upstream status 502");
    }

    #[tokio::test]
    async fn git_failures_hide_stderr() {
        let body = body_text(
            FixError::Upstream("fatal: unable to access 'https://***@github.com/a/b'".into())
                .into(),
        )
        .await;
        assert!(body.contains("Failed to apply fix"), "{body}");
        assert!(!body.contains("fatal"), "{body}");

        let io = std::io::Error::other("/var/tmp/pr-pilot/xyz: disk full");
        let body = body_text(FixError::Io(io).into()).await;
        assert!(!body.contains("/var/tmp"), "{body}");
    }

    #[tokio::test]
    async fn startup_errors_do_not_leak_internals() {
        let res = AppError::Startup("token=abc".into()).into_response();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("abc"));
    }
}
