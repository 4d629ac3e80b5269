use crate::config::llm_provider::LlmProvider;

/// Configuration for a chat model invocation.
///
/// # Fields
///
/// - `provider`: which hosted backend to call.
/// - `model`: the model identifier (e.g., `"llama-3.3-70b-versatile"`).
/// - `endpoint`: API base URL without the `/v1/...` suffix.
/// - `api_key`: bearer key for the provider.
/// - `max_tokens`: upper bound on generated tokens.
/// - `temperature`: sampling temperature; keep low for JSON-shaped answers.
/// - `top_p`: nucleus sampling cutoff.
/// - `timeout_secs`: request timeout in seconds.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Groq,
///     model: "llama-3.3-70b-versatile".to_string(),
///     endpoint: "https://api.groq.com/openai".to_string(),
///     api_key: Some("gsk-...".to_string()),
///     max_tokens: Some(1000),
///     temperature: Some(0.3),
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.max_tokens, Some(1000));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The hosted backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// API base URL.
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
