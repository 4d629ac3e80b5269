pub mod bearer_auth;
pub mod json_extractor;
