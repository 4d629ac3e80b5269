//! Branch-faithful write: commit the fix on the PR's head branch.
//!
//! Clones the head repository (possibly a fork) into a scoped temporary
//! directory, checks out the head ref, writes the file, then commits and
//! pushes. The temporary directory is removed when the guard drops, on every
//! exit path.

use std::{path::PathBuf, sync::Arc};

use git_context_engine::GitHubClient;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use crate::{
    FixOutcome, FixRequest, FixStrategy, commit_message,
    errors::{FixError, Result},
    git_runner::{GitRunner, redact},
};

/// Settings for branch-faithful fixes.
#[derive(Debug, Clone)]
pub struct BranchSettings {
    /// Parent of the per-fix temporary directories.
    pub work_root: PathBuf,
    /// Web base used for clone URLs, e.g. "https://github.com".
    pub clone_base: String,
    pub commit_name: String,
    pub commit_email: String,
    pub max_concurrency: usize,
}

#[derive(Clone)]
pub struct BranchFaithfulWrite {
    runner: Arc<dyn GitRunner>,
    semaphore: Arc<Semaphore>,
    settings: BranchSettings,
}

impl std::fmt::Debug for BranchFaithfulWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchFaithfulWrite")
            .field("settings", &self.settings)
            .field("available_permits", &self.semaphore.available_permits())
            .finish()
    }
}

impl BranchFaithfulWrite {
    pub fn new(runner: Arc<dyn GitRunner>, settings: BranchSettings) -> Self {
        let permits = settings.max_concurrency.max(1);
        Self {
            runner,
            semaphore: Arc::new(Semaphore::new(permits)),
            settings,
        }
    }

    #[instrument(skip_all, fields(owner = %req.owner, repo = %req.repo, path = %req.file_path, pr = ?req.pull_number))]
    pub(crate) async fn apply(&self, client: &GitHubClient, req: &FixRequest) -> Result<FixOutcome> {
        let number = req.pull_number.ok_or(FixError::MissingPullNumber)?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FixError::Upstream("fix queue is closed".into()))?;

        let pr = client.get_pull_request(&req.owner, &req.repo, number).await?;
        let head_ref = pr.head.ref_name;
        let head_repo = pr.head.repo_full_name.ok_or_else(|| {
            FixError::NotFound(format!("head repository of PR #{number} no longer exists"))
        })?;
        debug!(%head_ref, %head_repo, "resolved PR head");

        tokio::fs::create_dir_all(&self.settings.work_root).await?;
        let scratch = tempfile::Builder::new()
            .prefix("pr-pilot-fix-")
            .tempdir_in(&self.settings.work_root)?;
        let repo_dir = scratch.path().join("repo");

        let url = authenticated_clone_url(&self.settings.clone_base, client.token(), &head_repo);
        debug!(url = %redact(&url), dir = %scratch.path().display(), "cloning head repository");

        self.git(scratch.path(), &["clone", "--no-checkout", &url, "repo"])
            .await?;
        self.git(&repo_dir, &["checkout", &head_ref]).await?;

        let target = repo_dir.join(&req.file_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, req.new_content.as_bytes()).await?;

        let message = commit_message(&req.file_path);
        let name = format!("user.name={}", self.settings.commit_name);
        let email = format!("user.email={}", self.settings.commit_email);
        self.git(&repo_dir, &["add", "--", &req.file_path]).await?;
        self.git(&repo_dir, &["-c", &name, "-c", &email, "commit", "-m", &message])
            .await?;
        let sha = self.git(&repo_dir, &["rev-parse", "HEAD"]).await?;
        self.git(&repo_dir, &["push", "origin", &head_ref]).await?;

        let sha = sha.trim();
        info!(%head_ref, %head_repo, commit = %sha, "fix pushed to PR head branch");
        Ok(FixOutcome {
            strategy: FixStrategy::Branch,
            branch: Some(head_ref),
            commit_sha: (!sha.is_empty()).then(|| sha.to_string()),
        })
    }

    async fn git(&self, workdir: &std::path::Path, args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(workdir, &args).await
    }
}

/// `https://x-access-token:<token>@host/<owner>/<repo>.git`
fn authenticated_clone_url(clone_base: &str, token: &str, full_name: &str) -> String {
    let base = clone_base.trim_end_matches('/');
    let (scheme, host) = base.split_once("://").unwrap_or(("https", base));
    format!("{scheme}://x-access-token:{token}@{host}/{full_name}.git")
}
