pub mod pr_detail_response;
pub mod pr_detail_route;
pub mod repo_prs_route;
pub mod user_prs_route;
