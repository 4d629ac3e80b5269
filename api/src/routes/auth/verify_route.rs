use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use git_context_engine::{GitContextEngineError, GitContextEngineProviderError as P};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ErrorBody},
    error_handler::AppError,
};

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

/// Checks a token against `GET /user`, mirroring GitHub's status on failure.
#[instrument(name = "verify_route", skip_all)]
pub async fn verify_route(
    State(state): State<Arc<AppState>>,
    Query(q): Query<VerifyQuery>,
) -> Response {
    let Some(token) = q.token.filter(|t| !t.trim().is_empty()) else {
        return AppError::bad_request("Token not provided").into_response();
    };

    match state.github(token.trim()).get_authenticated_user().await {
        Ok(user) => Json(json!({ "valid": true, "userData": user })).into_response(),
        Err(GitContextEngineError::Provider(p)) => match upstream_status(&p) {
            Some(status) => {
                warn!(status = status.as_u16(), "token verification rejected");
                ErrorBody::new("Invalid token", None).into_response_with_status(status)
            }
            None => AppError::from(GitContextEngineError::Provider(p)).into_response(),
        },
        Err(e) => AppError::from(e).into_response(),
    }
}

fn upstream_status(p: &P) -> Option<StatusCode> {
    let code = match p {
        P::Unauthorized => 401,
        P::Forbidden => 403,
        P::NotFound => 404,
        P::RateLimited { .. } => 429,
        P::Server(code) | P::HttpStatus(code) => *code,
        P::Timeout | P::Network(_) | P::InvalidResponse(_) => return None,
    };
    StatusCode::from_u16(code).ok()
}
