//! Hosted chat-completion client used by the PR analyzer.
//!
//! The crate exposes:
//! - [`config`]: model configuration and env-driven defaults
//! - [`services::open_ai_service::OpenAiService`]: `/v1/chat/completions` client
//!   for OpenAI-compatible providers (Groq, OpenAI)
//! - [`TextGeneration`]: the seam consumers depend on, so tests can plug a
//!   scripted model in place of the HTTP client
//! - [`telemetry`]: formatting layer and filter helpers for the binary

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

use async_trait::async_trait;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, Result};
pub use services::open_ai_service::OpenAiService;

/// Single-shot text generation against a chat model.
#[async_trait]
pub trait TextGeneration: Send + Sync {
    /// Sends `prompt` (and an optional system message) and returns the raw
    /// text of the first choice.
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String>;
}

#[async_trait]
impl TextGeneration for OpenAiService {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        OpenAiService::generate(self, prompt, system).await
    }
}
