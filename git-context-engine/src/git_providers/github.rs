//! GitHub provider (REST v3) for pull requests, diffs and file contents.
//!
//! Endpoints used:
//!   * GET  /user
//!   * GET  /search/issues?q=is:pr author:{login}
//!   * GET  /repos/{owner}/{repo}
//!   * GET  /repos/{owner}/{repo}/pulls
//!   * GET  /repos/{owner}/{repo}/pulls/{number}          (json and diff media types)
//!   * GET  /repos/{owner}/{repo}/contents/{path}
//!   * PUT  /repos/{owner}/{repo}/contents/{path}

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::errors::{GitContextEngineError, GitContextEngineProviderError, GitContextEngineResult};
use crate::git_providers::types::*;

const JSON_MEDIA: &str = "application/vnd.github+json";
const DIFF_MEDIA: &str = "application/vnd.github.diff";
const API_VERSION: &str = "2022-11-28";

/// GitHub HTTP client wrapper bound to one user's bearer token.
///
/// Cheap to build: the `reqwest::Client` is shared, so handlers construct one
/// per request.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_api", &self.base_api)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: impl Into<String>, token: impl Into<String>) -> Self {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            token: token.into(),
        }
    }

    /// Bearer token this client acts with; used to authenticate git transports.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolves the identity behind the token (`GET /user`).
    #[instrument(skip(self))]
    pub async fn get_authenticated_user(&self) -> GitContextEngineResult<serde_json::Value> {
        let resp = self.send(self.request(Method::GET, "/user")).await?;
        Ok(resp.json().await?)
    }

    /// Lists pull requests of one repository (GitHub defaults: open, 30 per page).
    #[instrument(skip(self))]
    pub async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitContextEngineResult<Vec<PullRequestSummary>> {
        let path = format!("/repos/{}/{}/pulls", enc(owner), enc(repo));
        let raw: Vec<GitHubPr> = self.send(self.request(Method::GET, &path)).await?.json().await?;
        debug!(count = raw.len(), "GitHub list_pull_requests");

        Ok(raw
            .into_iter()
            .map(|pr| pr.into_domain(owner, repo).summary)
            .collect())
    }

    /// Searches PRs authored by the token's user, newest first.
    #[instrument(skip(self))]
    pub async fn search_user_pull_requests(
        &self,
        page: u32,
        per_page: u32,
    ) -> GitContextEngineResult<SearchPage> {
        let user: GitHubUser = self
            .send(self.request(Method::GET, "/user"))
            .await?
            .json()
            .await?;

        let q = format!("is:pr author:{}", user.login);
        let page_s = page.to_string();
        let per_page_s = per_page.to_string();
        let resp: GitHubSearchResponse = self
            .send(self.request(Method::GET, "/search/issues").query(&[
                ("q", q.as_str()),
                ("page", page_s.as_str()),
                ("per_page", per_page_s.as_str()),
                ("sort", "created"),
                ("order", "desc"),
            ]))
            .await?
            .json()
            .await?;

        debug!(
            login = %user.login,
            total = resp.total_count,
            items = resp.items.len(),
            "GitHub search_user_pull_requests"
        );

        Ok(SearchPage {
            total: resp.total_count,
            items: resp.items.into_iter().map(GitHubSearchItem::into_summary).collect(),
        })
    }

    /// Fetches PR metadata including head/base refs.
    #[instrument(skip(self))]
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> GitContextEngineResult<PullRequest> {
        let path = format!("/repos/{}/{}/pulls/{}", enc(owner), enc(repo), number);
        let raw: GitHubPr = self.send(self.request(Method::GET, &path)).await?.json().await?;
        Ok(raw.into_domain(owner, repo))
    }

    /// Fetches the unified diff of a PR.
    #[instrument(skip(self))]
    pub async fn get_pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> GitContextEngineResult<String> {
        let path = format!("/repos/{}/{}/pulls/{}", enc(owner), enc(repo), number);
        let text = self
            .send(
                self.request(Method::GET, &path)
                    .header(reqwest::header::ACCEPT, DIFF_MEDIA),
            )
            .await?
            .text()
            .await?;
        debug!(diff_bytes = text.len(), "GitHub get_pull_request_diff");
        Ok(text)
    }

    /// Probes read access to a repository.
    #[instrument(skip(self))]
    pub async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitContextEngineResult<RepositoryAccess> {
        let path = format!("/repos/{}/{}", enc(owner), enc(repo));
        let raw: GitHubRepo = self.send(self.request(Method::GET, &path)).await?.json().await?;
        Ok(RepositoryAccess {
            full_name: raw.full_name,
            private: raw.private,
            default_branch: raw.default_branch,
            can_push: raw.permissions.map(|p| p.push),
        })
    }

    /// Returns the blob SHA of a file, or `None` if it does not exist (404).
    ///
    /// A directory at `path` is a validation error.
    #[instrument(skip(self))]
    pub async fn get_file_sha(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> GitContextEngineResult<Option<String>> {
        let url_path = format!("/repos/{}/{}/contents/{}", enc(owner), enc(repo), enc_path(path));
        let resp = match self.send(self.request(Method::GET, &url_path)).await {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() => {
                debug!(%path, "file does not exist, it will be created");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let value: serde_json::Value = resp.json().await?;
        if value.is_array() {
            return Err(GitContextEngineError::Validation(format!(
                "path {path} is a directory, not a file"
            )));
        }

        value
            .get("sha")
            .and_then(|s| s.as_str())
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| {
                GitContextEngineProviderError::InvalidResponse(
                    "contents response has no `sha`".into(),
                )
                .into()
            })
    }

    /// Creates or updates a file through the contents API.
    ///
    /// `sha` is sent only when replacing an existing file.
    #[instrument(skip(self, write), fields(owner = write.owner, repo = write.repo, path = write.path))]
    pub async fn write_file(&self, write: &FileWrite<'_>) -> GitContextEngineResult<CommitResult> {
        let url_path = format!(
            "/repos/{}/{}/contents/{}",
            enc(write.owner),
            enc(write.repo),
            enc_path(write.path)
        );
        let body = GitHubContentWrite {
            message: write.message,
            content: BASE64.encode(write.content.as_bytes()),
            sha: write.sha,
            branch: write.branch,
        };

        let out: GitHubContentWriteResponse = self
            .send(self.request(Method::PUT, &url_path).json(&body))
            .await?
            .json()
            .await?;

        debug!(
            update = write.sha.is_some(),
            commit = ?out.commit.as_ref().map(|c| &c.sha),
            "GitHub write_file"
        );

        Ok(CommitResult {
            commit_sha: out.commit.as_ref().map(|c| c.sha.clone()),
            html_url: out.commit.and_then(|c| c.html_url),
            content_sha: out.content.map(|c| c.sha),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_api, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, JSON_MEDIA)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder) -> GitContextEngineResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let rate_limited = rate_limit_signal(status, resp.headers());
        let url = resp.url().path().to_string();
        let body = resp.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            %url,
            body = %body.chars().take(200).collect::<String>(),
            "GitHub returned non-success status"
        );

        Err(GitContextEngineProviderError::from_status(status.as_u16(), rate_limited).into())
    }
}

/// Detects GitHub's rate-limit signals.
///
/// Returns `Some(retry_after_secs)` for 429, and for 403 carrying either a
/// `retry-after` header (secondary limits) or `x-ratelimit-remaining: 0`.
fn rate_limit_signal(status: StatusCode, headers: &HeaderMap) -> Option<Option<u64>> {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };
    let retry_after = header_u64("retry-after");

    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(retry_after),
        StatusCode::FORBIDDEN => {
            if retry_after.is_some() {
                return Some(retry_after);
            }
            let exhausted = headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.trim() == "0");
            if !exhausted {
                return None;
            }
            let wait = header_u64("x-ratelimit-reset").map(|reset| {
                let now = Utc::now().timestamp().max(0) as u64;
                reset.saturating_sub(now)
            });
            Some(wait)
        }
        _ => None,
    }
}

/// Splits `.../repos/{owner}/{repo}` (API) or `https://github.com/{owner}/{repo}/pull/N`.
pub fn owner_repo_from_urls(repository_url: Option<&str>, html_url: &str) -> Option<(String, String)> {
    if let Some(url) = repository_url {
        if let Some((_, rest)) = url.split_once("/repos/") {
            let mut parts = rest.split('/').filter(|p| !p.is_empty());
            if let (Some(o), Some(r)) = (parts.next(), parts.next()) {
                return Some((o.to_string(), r.to_string()));
            }
        }
    }

    let without_scheme = html_url.split_once("://").map(|(_, r)| r).unwrap_or(html_url);
    let mut parts = without_scheme.split('/').skip(1).filter(|p| !p.is_empty());
    match (parts.next(), parts.next()) {
        (Some(o), Some(r)) => Some((o.to_string(), r.to_string())),
        _ => None,
    }
}

fn enc(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Encodes each path segment while keeping `/` separators.
fn enc_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(enc)
        .collect::<Vec<_>>()
        .join("/")
}

/* ===========================================================================
Wire types (subset of GitHub responses)
======================================================================== */

#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: u64,
    login: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl GitHubUser {
    fn into_author(self) -> PrAuthor {
        PrAuthor {
            login: self.login,
            id: self.id,
            avatar_url: self.avatar_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubPr {
    id: u64,
    number: u64,
    title: String,
    state: PrState,
    html_url: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<GitHubUser>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    draft: Option<bool>,
    head: GitHubRef,
    base: GitHubRef,
    #[serde(default)]
    additions: Option<u64>,
    #[serde(default)]
    deletions: Option<u64>,
    #[serde(default)]
    changed_files: Option<u64>,
}

impl GitHubPr {
    fn into_domain(self, owner: &str, repo: &str) -> PullRequest {
        let enrichment = PrEnrichment {
            head_ref: self.head.r#ref.clone(),
            base_ref: self.base.r#ref.clone(),
            draft: self.draft.unwrap_or(false),
            additions: self.additions,
            deletions: self.deletions,
            changed_files: self.changed_files,
        };

        let summary = PullRequestSummary {
            id: self.id,
            number: self.number,
            title: self.title,
            state: self.state,
            repository_owner: owner.to_string(),
            repository_name: repo.to_string(),
            repository: format!("{owner}/{repo}"),
            html_url: self.html_url,
            user: self.user.map(GitHubUser::into_author),
            created_at: self.created_at,
            enrichment: Some(enrichment),
        };

        PullRequest {
            summary,
            body: self.body,
            head: self.head.into_branch_ref(),
            base: self.base.into_branch_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    r#ref: String,
    sha: String,
    #[serde(default)]
    repo: Option<GitHubRefRepo>,
}

impl GitHubRef {
    fn into_branch_ref(self) -> BranchRef {
        let (repo_full_name, clone_url) = match self.repo {
            Some(r) => (Some(r.full_name), r.clone_url),
            None => (None, None),
        };
        BranchRef {
            ref_name: self.r#ref,
            sha: self.sha,
            repo_full_name,
            clone_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRefRepo {
    full_name: String,
    #[serde(default)]
    clone_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubSearchResponse {
    total_count: u64,
    #[serde(default)]
    items: Vec<GitHubSearchItem>,
}

#[derive(Debug, Deserialize)]
struct GitHubSearchItem {
    id: u64,
    number: u64,
    title: String,
    state: PrState,
    html_url: String,
    #[serde(default)]
    repository_url: Option<String>,
    #[serde(default)]
    user: Option<GitHubUser>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl GitHubSearchItem {
    fn into_summary(self) -> PullRequestSummary {
        let (owner, repo) = owner_repo_from_urls(self.repository_url.as_deref(), &self.html_url)
            .unwrap_or_else(|| {
                warn!(number = self.number, "cannot derive owner/repo from search item");
                (String::new(), String::new())
            });

        PullRequestSummary {
            id: self.id,
            number: self.number,
            title: self.title,
            state: self.state,
            repository: format!("{owner}/{repo}"),
            repository_owner: owner,
            repository_name: repo,
            html_url: self.html_url,
            user: self.user.map(GitHubUser::into_author),
            created_at: self.created_at,
            enrichment: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    full_name: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    permissions: Option<GitHubRepoPermissions>,
}

#[derive(Debug, Deserialize)]
struct GitHubRepoPermissions {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Serialize)]
struct GitHubContentWrite<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GitHubContentWriteResponse {
    #[serde(default)]
    content: Option<GitHubContentRef>,
    #[serde(default)]
    commit: Option<GitHubCommitRef>,
}

#[derive(Debug, Deserialize)]
struct GitHubContentRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitRef {
    sha: String,
    #[serde(default)]
    html_url: Option<String>,
}
