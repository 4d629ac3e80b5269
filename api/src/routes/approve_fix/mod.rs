pub mod approve_fix_request;
pub mod approve_fix_route;
