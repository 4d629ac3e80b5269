pub mod approve_fix;
pub mod auth;
pub mod health_route;
pub mod pull_requests;
