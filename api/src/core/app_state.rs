use std::sync::Arc;

use ai_llm_service::{OpenAiService, TextGeneration};
use fix_applicator::{BranchSettings, CliGitRunner, FixApplicator, FixStrategy, GitRunner};
use git_context_engine::{GitHubClient, OAuthApp};
use reqwest::Client;
use tracing::info;

use crate::{core::config::AppConfig, error_handler::AppError};

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Shared HTTP client; per-request GitHub clients clone it.
    pub http: Client,
    /// Model behind the PR analyzer.
    pub model: Arc<dyn TextGeneration>,
    pub fixer: FixApplicator,
    pub oauth: OAuthApp,
}

impl AppState {
    /// Builds the production state: hosted model and the `git` CLI.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let model = OpenAiService::new(config.llm.clone()).map_err(|e| AppError::Startup(e.to_string()))?;
        let runner = Arc::new(CliGitRunner::new(config.fix.git_timeout));
        Self::with_parts(config, Arc::new(model), runner)
    }

    /// Builds state around an injected model and git runner.
    pub fn with_parts(
        config: AppConfig,
        model: Arc<dyn TextGeneration>,
        runner: Arc<dyn GitRunner>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(concat!("pr-pilot/", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Startup(format!("http client: {e}")))?;

        let fixer = match config.fix.strategy {
            FixStrategy::Direct => FixApplicator::DirectWrite,
            FixStrategy::Branch => FixApplicator::branch(
                runner,
                BranchSettings {
                    work_root: config.fix.work_root.clone(),
                    clone_base: config.github.clone_base.clone(),
                    commit_name: config.fix.commit_name.clone(),
                    commit_email: config.fix.commit_email.clone(),
                    max_concurrency: config.fix.max_concurrency,
                },
            ),
        };

        let oauth = OAuthApp::new(
            config.github.client_id.clone(),
            config.github.client_secret.clone(),
            config.github.redirect_uri.clone(),
            config.github.oauth_base.clone(),
        );

        info!(
            strategy = %fixer.strategy(),
            github = %config.github.api_base,
            model = %config.llm.model,
            "application state ready"
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            model,
            fixer,
            oauth,
        })
    }

    /// GitHub client acting as the caller.
    pub fn github(&self, token: &str) -> GitHubClient {
        GitHubClient::new(self.http.clone(), &self.config.github.api_base, token)
    }
}
