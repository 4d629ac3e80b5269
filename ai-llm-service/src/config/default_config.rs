//! Default chat-model config loaded from environment-like lookups.
//!
//! # Variables
//!
//! - `LLM_PROVIDER`     = `groq` (default) or `openai`
//! - `LLM_API_KEY`      = API key (mandatory; falls back to `GROQ_API_KEY` /
//!   `OPENAI_API_KEY` depending on the provider)
//! - `LLM_ENDPOINT`     = API base URL (defaults per provider)
//! - `LLM_MODEL`        = model id (defaults per provider)
//! - `LLM_MAX_TOKENS`   = max generated tokens (default `1000`)
//! - `LLM_TEMPERATURE`  = sampling temperature in `0.0..=2.0` (default `0.3`)
//! - `LLM_TIMEOUT_SECS` = request timeout (default `60`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, opt_f32, opt_u32, opt_u64, opt_var, validate_http_endpoint,
        validate_range_f32,
    },
};

/// Low temperature keeps JSON-shaped answers stable between calls.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Enough for the compact analysis schema.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn default_model(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Groq => "llama-3.3-70b-versatile",
        LlmProvider::OpenAI => "gpt-4o-mini",
    }
}

fn provider_key_var(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Groq => "GROQ_API_KEY",
        LlmProvider::OpenAI => "OPENAI_API_KEY",
    }
}

/// Builds the analysis model config from an arbitrary variable lookup.
///
/// # Errors
///
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_PROVIDER`
/// - [`ConfigError::MissingVar`] if no API key is available
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad numbers
/// - [`ConfigError::InvalidFormat`] if `LLM_ENDPOINT` is not an http(s) URL
pub fn config_from_lookup<F>(lookup: &F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match opt_var(lookup, "LLM_PROVIDER") {
        Some(raw) => raw.parse::<LlmProvider>()?,
        None => LlmProvider::Groq,
    };

    let api_key = opt_var(lookup, "LLM_API_KEY")
        .or_else(|| opt_var(lookup, provider_key_var(provider)))
        .ok_or(ConfigError::MissingVar("LLM_API_KEY"))?;

    let endpoint = opt_var(lookup, "LLM_ENDPOINT")
        .unwrap_or_else(|| provider.default_endpoint().to_string());
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;

    let model = opt_var(lookup, "LLM_MODEL").unwrap_or_else(|| default_model(provider).into());

    let temperature = opt_f32(lookup, "LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    let max_tokens = opt_u32(lookup, "LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS);
    let timeout_secs = opt_u64(lookup, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(max_tokens),
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}
