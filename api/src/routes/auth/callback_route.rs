use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// Exchanges the OAuth code and hands the token to the frontend.
#[instrument(name = "callback_route", skip_all)]
pub async fn callback_route(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CallbackQuery>,
) -> AppResult<Response> {
    let code = q
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Code not provided"))?;

    let token = state.oauth.exchange_code(&state.http, code.trim()).await?;
    info!("OAuth exchange completed");

    let location = format!(
        "{}/auth/callback?token={}",
        state.config.frontend_url,
        urlencoding::encode(&token)
    );
    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}
