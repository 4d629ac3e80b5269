use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    middleware_layer::bearer_auth::BearerToken,
    routes::pull_requests::pr_detail_response::PullRequestDetail,
};

/// One PR with diff and AI analysis. Nothing is persisted.
#[instrument(name = "pr_detail_route", skip(state, token))]
pub async fn pr_detail_route(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((number, owner, repo)): Path<(u64, String, String)>,
) -> AppResult<Json<PullRequestDetail>> {
    let github = state.github(&token.0);
    let (pr, diff) = tokio::try_join!(
        github.get_pull_request(&owner, &repo, number),
        github.get_pull_request_diff(&owner, &repo, number),
    )?;

    let analysis = pr_reviewer::analyze(
        state.model.as_ref(),
        &pr.summary.title,
        pr.body.as_deref(),
        &diff,
    )
    .await?;

    info!(
        fixes = analysis.suggestions.code_fixes.len(),
        diff_bytes = diff.len(),
        "PR detail assembled"
    );
    Ok(Json(PullRequestDetail::new(pr, diff, analysis)))
}
