pub mod infrastructure_service_errors;
