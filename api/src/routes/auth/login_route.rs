use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::core::app_state::AppState;

/// Sends the browser to GitHub's authorize page.
#[instrument(name = "login_route", skip(state))]
pub async fn login_route(State(state): State<Arc<AppState>>) -> Response {
    let url = state.oauth.authorize_url();
    debug!(%url, "redirecting to GitHub authorize");
    (StatusCode::FOUND, [(LOCATION, url)]).into_response()
}
