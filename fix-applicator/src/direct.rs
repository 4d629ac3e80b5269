//! Direct write through the contents API (default branch).

use git_context_engine::{GitHubClient, types::FileWrite};
use tracing::{info, instrument};

use crate::{FixOutcome, FixRequest, FixStrategy, commit_message, errors::Result};

#[instrument(skip_all, fields(owner = %req.owner, repo = %req.repo, path = %req.file_path))]
pub(crate) async fn apply(client: &GitHubClient, req: &FixRequest) -> Result<FixOutcome> {
    let sha = client
        .get_file_sha(&req.owner, &req.repo, &req.file_path)
        .await?;
    let message = commit_message(&req.file_path);

    let out = client
        .write_file(&FileWrite {
            owner: &req.owner,
            repo: &req.repo,
            path: &req.file_path,
            content: &req.new_content,
            sha: sha.as_deref(),
            message: &message,
            branch: None,
        })
        .await?;

    info!(created = sha.is_none(), commit = ?out.commit_sha, "fix written via contents API");
    Ok(FixOutcome {
        strategy: FixStrategy::Direct,
        branch: None,
        commit_sha: out.commit_sha,
    })
}
