//! Runtime configuration loaded from environment variables.
//!
//! All values go through a lookup closure so tests can build a config without
//! touching the process environment.

use std::{path::PathBuf, time::Duration};

use ai_llm_service::{
    AiLlmError, LlmModelConfig,
    config::default_config,
    error_handler::{must_var, opt_u32, opt_u64, opt_var, validate_http_endpoint},
};
use fix_applicator::FixStrategy;
use thiserror::Error;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_WEB_BASE: &str = "https://github.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_FIX_MAX_CONCURRENCY: usize = 2;
pub const DEFAULT_COMMIT_NAME: &str = "pr-pilot";
pub const DEFAULT_COMMIT_EMAIL: &str = "pr-pilot@users.noreply.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    /// Missing or malformed variable, reported by the shared env helpers.
    #[error(transparent)]
    Env(#[from] AiLlmError),
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base: String,
    pub oauth_base: String,
    pub clone_base: String,
}

#[derive(Debug, Clone)]
pub struct FixSettings {
    pub strategy: FixStrategy,
    pub git_timeout: Duration,
    pub max_concurrency: usize,
    pub work_root: PathBuf,
    pub commit_name: String,
    pub commit_email: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_address: String,
    pub frontend_url: String,
    pub http_timeout: Duration,
    pub github: GitHubSettings,
    pub llm: LlmModelConfig,
    pub fix: FixSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_address = match opt_var(lookup, "API_ADDRESS") {
            Some(addr) => addr,
            None => match opt_var(lookup, "PORT") {
                Some(port) => {
                    port.parse::<u16>().map_err(|_| ConfigError::Invalid {
                        var: "PORT",
                        reason: format!("`{port}` is not a port number"),
                    })?;
                    format!("0.0.0.0:{port}")
                }
                None => DEFAULT_API_ADDRESS.to_string(),
            },
        };

        let github = GitHubSettings {
            client_id: must_var(lookup, "GITHUB_CLIENT_ID")?,
            client_secret: must_var(lookup, "GITHUB_CLIENT_SECRET")?,
            redirect_uri: must_var(lookup, "GITHUB_REDIRECT_URI")?,
            api_base: http_url(lookup, "GITHUB_API_BASE", DEFAULT_GITHUB_API_BASE)?,
            oauth_base: http_url(lookup, "GITHUB_OAUTH_BASE", DEFAULT_GITHUB_WEB_BASE)?,
            clone_base: http_url(lookup, "GIT_CLONE_BASE", DEFAULT_GITHUB_WEB_BASE)?,
        };

        let frontend_url = must_var(lookup, "FRONTEND_URL")?
            .trim_end_matches('/')
            .to_string();

        let strategy_raw = must_var(lookup, "FIX_STRATEGY")?;
        let strategy = strategy_raw
            .parse::<FixStrategy>()
            .map_err(|reason| ConfigError::Invalid {
                var: "FIX_STRATEGY",
                reason,
            })?;

        let max_concurrency = opt_u32(lookup, "FIX_MAX_CONCURRENCY")?
            .map_or(DEFAULT_FIX_MAX_CONCURRENCY, |n| n as usize);
        if max_concurrency == 0 {
            return Err(ConfigError::Invalid {
                var: "FIX_MAX_CONCURRENCY",
                reason: "must be at least 1".into(),
            });
        }

        let fix = FixSettings {
            strategy,
            git_timeout: Duration::from_secs(
                opt_u64(lookup, "GIT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_GIT_TIMEOUT_SECS),
            ),
            max_concurrency,
            work_root: opt_var(lookup, "FIX_WORK_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            commit_name: opt_var(lookup, "GIT_COMMIT_NAME")
                .unwrap_or_else(|| DEFAULT_COMMIT_NAME.into()),
            commit_email: opt_var(lookup, "GIT_COMMIT_EMAIL")
                .unwrap_or_else(|| DEFAULT_COMMIT_EMAIL.into()),
        };

        Ok(Self {
            api_address,
            frontend_url,
            http_timeout: Duration::from_secs(
                opt_u64(lookup, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            github,
            llm: default_config::config_from_lookup(lookup)?,
            fix,
        })
    }
}

fn http_url<F>(lookup: &F, name: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = opt_var(lookup, name).unwrap_or_else(|| default.to_string());
    validate_http_endpoint(name, &value)?;
    Ok(value.trim_end_matches('/').to_string())
}
