pub mod errors;
pub mod infrastructure_service;
