use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use git_context_engine::{
    list_user_pull_requests,
    types::{Pagination, PullRequestSummary},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    middleware_layer::bearer_auth::BearerToken,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct UserPrsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UserPrsResponse {
    pub data: Vec<PullRequestSummary>,
    pub pagination: Pagination,
}

/// PRs authored by the caller, newest first.
#[instrument(name = "user_prs_route", skip(state, token))]
pub async fn user_prs_route(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    Query(q): Query<UserPrsQuery>,
) -> AppResult<Json<UserPrsResponse>> {
    let github = state.github(&token.0);
    let page = list_user_pull_requests(
        &github,
        q.page.unwrap_or(DEFAULT_PAGE),
        q.per_page.unwrap_or(DEFAULT_PER_PAGE),
    )
    .await?;

    Ok(Json(UserPrsResponse {
        data: page.items,
        pagination: page.pagination,
    }))
}
