use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use git_context_engine::types::PullRequestSummary;
use tracing::{debug, instrument};

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    middleware_layer::bearer_auth::BearerToken,
};

#[instrument(name = "repo_prs_route", skip(state, token))]
pub async fn repo_prs_route(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Path((owner, repo)): Path<(String, String)>,
) -> AppResult<Json<Vec<PullRequestSummary>>> {
    let prs = state.github(&token.0).list_pull_requests(&owner, &repo).await?;
    debug!(count = prs.len(), "repository PRs listed");
    Ok(Json(prs))
}
