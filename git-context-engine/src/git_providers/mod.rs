//! GitHub provider client and the shared pull request data model.

pub mod github;
pub mod types;

pub use github::GitHubClient;
pub use types::*;
