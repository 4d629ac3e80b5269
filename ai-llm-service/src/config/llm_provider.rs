use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Hosted backend used for chat completions.
///
/// Both variants speak the OpenAI `/v1/chat/completions` protocol; they only
/// differ in their default endpoint.
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// let provider: LlmProvider = "groq".parse().unwrap();
/// assert_eq!(provider.default_endpoint(), "https://api.groq.com/openai");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Groq cloud (OpenAI-compatible surface under `/openai`).
    Groq,
    /// OpenAI API.
    OpenAI,
}

impl LlmProvider {
    /// Base URL used when `LLM_ENDPOINT` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai",
            LlmProvider::OpenAI => "https://api.openai.com",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Groq => f.write_str("groq"),
            LlmProvider::OpenAI => f.write_str("openai"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
