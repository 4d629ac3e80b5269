pub mod callback_route;
pub mod login_route;
pub mod verify_route;
