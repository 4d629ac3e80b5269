//! GitHub OAuth web flow: authorize URL and code-for-token exchange.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::{GitContextEngineOAuthError, GitContextEngineResult};

/// Scope requested at login; `repo` covers private repos and contents writes.
pub const OAUTH_SCOPE: &str = "repo";

/// Registered OAuth application.
#[derive(Clone)]
pub struct OAuthApp {
    pub client_id: String,
    client_secret: String,
    pub redirect_uri: String,
    /// Web base, e.g. "https://github.com".
    pub oauth_base: String,
}

impl std::fmt::Debug for OAuthApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("oauth_base", &self.oauth_base)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl OAuthApp {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        oauth_base: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// URL the browser is redirected to at login.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.oauth_base,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            OAUTH_SCOPE,
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// GitHub reports bad codes with HTTP 200 and an `error` field, so the
    /// body is inspected regardless of status.
    #[instrument(skip(self, http, code))]
    pub async fn exchange_code(&self, http: &Client, code: &str) -> GitContextEngineResult<String> {
        let url = format!("{}/login/oauth/access_token", self.oauth_base);
        let body = TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
            redirect_uri: &self.redirect_uri,
        };

        let resp = http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        let parsed: TokenResponse = resp.json().await?;

        if let Some(error) = parsed.error {
            warn!(status = status.as_u16(), %error, "oauth exchange rejected");
            return Err(GitContextEngineOAuthError::Rejected {
                error,
                description: parsed.error_description,
            }
            .into());
        }

        match parsed.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                debug!("oauth exchange succeeded");
                Ok(token)
            }
            None => Err(GitContextEngineOAuthError::MissingAccessToken.into()),
        }
    }
}
