use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use fix_applicator::FixStrategy;
use git_context_engine::{GitContextEngineError, GitContextEngineProviderError};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::MessageBody},
    error_handler::{AppError, AppResult},
    middleware_layer::bearer_auth::BearerToken,
    routes::approve_fix::approve_fix_request::ApproveFixRequest,
};

/// Writes a user-approved fix.
///
/// Checks run in order and stop at the first failure: bearer token (401),
/// required fields (400, before any GitHub call), identity re-check (401),
/// repository read access (403), then the write itself.
#[instrument(name = "approve_fix_route", skip_all)]
pub async fn approve_fix_route(
    State(state): State<Arc<AppState>>,
    token: BearerToken,
    body: Result<Json<ApproveFixRequest>, JsonRejection>,
) -> AppResult<Json<MessageBody>> {
    let Json(body) = body?;
    let strategy = state.fixer.strategy();
    let req = body.into_fix_request(strategy).map_err(|missing| AppError::BadRequest {
        message: "Missing required fields".into(),
        details: Some(missing.join(", ")),
    })?;

    let github = state.github(&token.0);

    let user = github.get_authenticated_user().await?;
    let login = user.get("login").and_then(|v| v.as_str()).unwrap_or_default();

    let access = github
        .get_repository(&req.owner, &req.repo)
        .await
        .map_err(|e| match e {
            e if e.is_not_found() || is_forbidden(&e) => AppError::Forbidden(
                "You do not have access to this repository".into(),
            ),
            other => other.into(),
        })?;

    if strategy == FixStrategy::Direct && access.can_push == Some(false) {
        warn!(%login, repo = %access.full_name, "caller cannot push to repository");
        return Err(AppError::Forbidden(
            "You do not have write access to this repository".into(),
        ));
    }

    let outcome = state.fixer.apply(&github, &req).await?;
    info!(
        %login,
        repo = %access.full_name,
        path = %req.file_path,
        branch = ?outcome.branch,
        commit = ?outcome.commit_sha,
        "fix approved"
    );

    Ok(Json(MessageBody {
        message: "Fix approved successfully".into(),
    }))
}

fn is_forbidden(e: &GitContextEngineError) -> bool {
    matches!(
        e,
        GitContextEngineError::Provider(GitContextEngineProviderError::Forbidden)
    )
}
