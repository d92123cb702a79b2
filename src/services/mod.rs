pub mod errors;
pub mod game_service;
pub mod notification_service;

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8080";
