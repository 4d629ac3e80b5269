//! Error type for the analyzer.
//!
//! Parse failures never surface here: they degrade to a fallback analysis.
//! Only model transport/provider failures propagate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

pub type ReviewResult<T> = Result<T, ReviewError>;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// The model call failed (transport, timeout, non-2xx).
    #[error("model call failed: {0}")]
    Model(#[from] AiLlmError),
}

impl ReviewError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReviewError::Model(AiLlmError::Timeout(_)))
    }
}
