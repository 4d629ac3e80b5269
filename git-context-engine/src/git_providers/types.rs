//! Data model for pull requests as exposed to the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// PR lifecycle state as reported by GitHub (merged PRs are `closed`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    Open,
    Closed,
}

/// Minimal author info. Never contains any access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrAuthor {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Fields only known after fetching the full PR (`pulls.get` / `pulls.list`).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PrEnrichment {
    pub head_ref: String,
    pub base_ref: String,
    pub draft: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_files: Option<u64>,
}

/// A pull request as listed to the user.
///
/// Sourced verbatim from GitHub and never persisted; `enrichment` is `None`
/// when only the search-result shape is available.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PullRequestSummary {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: PrState,
    pub repository_owner: String,
    pub repository_name: String,
    /// `owner/repo`, kept for clients that expect the combined form.
    pub repository: String,
    pub html_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PrAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub enrichment: Option<PrEnrichment>,
}

/// Head or base side of a pull request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    /// `owner/repo` of the repository holding the branch; `None` when the
    /// fork was deleted.
    pub repo_full_name: Option<String>,
    #[serde(skip)]
    pub clone_url: Option<String>,
}

/// Full pull request metadata (no diff, no analysis).
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub summary: PullRequestSummary,
    pub body: Option<String>,
    pub head: BranchRef,
    pub base: BranchRef,
}

/// One page of the authenticated user's PR search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub items: Vec<PullRequestSummary>,
    pub total: u64,
}

/// Pagination metadata returned alongside PR pages.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
}

impl Pagination {
    /// `has_next_page = page * per_page < total`, `total_pages = ceil(total / per_page)`.
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let per = u64::from(per_page.max(1));
        Self {
            current_page: page,
            per_page,
            total,
            total_pages: total.div_ceil(per),
            has_next_page: u64::from(page).saturating_mul(per) < total,
        }
    }
}

/// User PRs plus pagination, ready for the `/prs/user` response.
#[derive(Debug, Clone)]
pub struct UserPullRequestPage {
    pub items: Vec<PullRequestSummary>,
    pub pagination: Pagination,
}

/// Read-access probe result for a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryAccess {
    pub full_name: String,
    pub private: bool,
    pub default_branch: String,
    /// `Some(false)` when GitHub reports the principal cannot push.
    pub can_push: Option<bool>,
}

/// Input for the contents API write.
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub path: &'a str,
    pub content: &'a str,
    /// Blob SHA of the file being replaced; `None` creates the file.
    pub sha: Option<&'a str>,
    pub message: &'a str,
    /// Target branch; `None` lets GitHub use the default branch.
    pub branch: Option<&'a str>,
}

/// Outcome of a contents API write.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub commit_sha: Option<String>,
    pub content_sha: Option<String>,
    pub html_url: Option<String>,
}
