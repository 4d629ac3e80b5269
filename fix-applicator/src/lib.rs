//! Applying suggested code fixes to a pull request's repository.
//!
//! Two strategies, chosen once per deployment:
//! - [`FixStrategy::Direct`]: contents API write on the default branch.
//! - [`FixStrategy::Branch`]: clone + commit + push on the PR head branch,
//!   which may live in a fork.
//!
//! Branch fixes are bounded by a `tokio::Semaphore`; each one runs in its own
//! scratch directory.

use std::{
    fmt,
    path::{Component, Path},
    str::FromStr,
    sync::Arc,
};

use git_context_engine::GitHubClient;
use tracing::info;

pub mod branch;
mod direct;
pub mod errors;
pub mod git_runner;

pub use branch::{BranchFaithfulWrite, BranchSettings};
pub use errors::{FixError, Result};
pub use git_runner::{CliGitRunner, GitRunner};

/// Which strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStrategy {
    Direct,
    Branch,
}

impl fmt::Display for FixStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FixStrategy::Direct => "direct",
            FixStrategy::Branch => "branch",
        })
    }
}

impl FromStr for FixStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(FixStrategy::Direct),
            "branch" => Ok(FixStrategy::Branch),
            other => Err(format!("unknown fix strategy `{other}` (expected `direct` or `branch`)")),
        }
    }
}

/// A fix the user approved.
#[derive(Debug, Clone)]
pub struct FixRequest {
    pub owner: String,
    pub repo: String,
    pub file_path: String,
    /// Written verbatim.
    pub new_content: String,
    /// Required by [`FixStrategy::Branch`].
    pub pull_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    pub strategy: FixStrategy,
    /// Branch the commit landed on; `None` for the default branch.
    pub branch: Option<String>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FixApplicator {
    DirectWrite,
    BranchFaithfulWrite(BranchFaithfulWrite),
}

impl FixApplicator {
    pub fn branch(runner: Arc<dyn GitRunner>, settings: BranchSettings) -> Self {
        FixApplicator::BranchFaithfulWrite(BranchFaithfulWrite::new(runner, settings))
    }

    pub fn strategy(&self) -> FixStrategy {
        match self {
            FixApplicator::DirectWrite => FixStrategy::Direct,
            FixApplicator::BranchFaithfulWrite(_) => FixStrategy::Branch,
        }
    }

    /// Validates the path, then applies the fix with the configured strategy.
    pub async fn apply(&self, client: &GitHubClient, req: &FixRequest) -> Result<FixOutcome> {
        validate_file_path(&req.file_path)?;
        info!(
            strategy = %self.strategy(),
            owner = %req.owner,
            repo = %req.repo,
            path = %req.file_path,
            "applying fix"
        );

        match self {
            FixApplicator::DirectWrite => direct::apply(client, req).await,
            FixApplicator::BranchFaithfulWrite(b) => b.apply(client, req).await,
        }
    }
}

pub(crate) fn commit_message(path: &str) -> String {
    format!("Apply suggested fix to {path}")
}

/// Accepts only non-empty relative paths without `..` segments.
pub fn validate_file_path(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(FixError::InvalidPath("path is empty".into()));
    }
    if path.contains('\0') {
        return Err(FixError::InvalidPath("path contains NUL".into()));
    }
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(FixError::InvalidPath(format!("`{path}` escapes the repository")));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(FixError::InvalidPath(format!("`{path}` must be relative")));
            }
        }
    }
    Ok(())
}
