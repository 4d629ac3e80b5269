//! HTTP layer: routes, auth extraction, error mapping and startup.

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

pub use crate::core::{
    app_state::AppState,
    config::{AppConfig, ConfigError},
};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        approve_fix::approve_fix_route::approve_fix_route,
        auth::{callback_route::callback_route, login_route::login_route, verify_route::verify_route},
        health_route::{health_route, root_route},
        pull_requests::{
            pr_detail_route::pr_detail_route, repo_prs_route::repo_prs_route,
            user_prs_route::user_prs_route,
        },
    },
};

/// Loads configuration from the environment and serves until shutdown.
pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let address = config.api_address.clone();
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let github = Router::new()
        .route("/login", get(login_route))
        .route("/callback", get(callback_route))
        .route("/verify", get(verify_route))
        .route("/prs/user", get(user_prs_route))
        .route("/prs/{owner}/{repo}", get(repo_prs_route))
        .route("/pr/{id}/{owner}/{repo}", get(pr_detail_route))
        .route("/pr/approve-fix", post(approve_fix_route));

    Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_route))
        .nest("/api/github", github)
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!(%frontend_url, "FRONTEND_URL is not a valid origin; CORS disabled");
            layer
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl+C received, shutting down"),
        _ = terminate => info!("SIGTERM received, shutting down"),
    }
}
