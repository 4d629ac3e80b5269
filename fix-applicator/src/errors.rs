use git_context_engine::GitContextEngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixError>;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("invalid file path: {0}")]
    InvalidPath(String),

    #[error("pullNumber is required to commit on the PR head branch")]
    MissingPullNumber,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("nothing to commit: content is identical")]
    NoChanges,

    #[error("git {step} timed out after {secs}s")]
    Timeout { step: String, secs: u64 },

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    GitHub(#[from] GitContextEngineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
