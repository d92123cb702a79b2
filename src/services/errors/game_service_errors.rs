use crate::repositories::errors::infrastructure_service_errors::InfrastructureError;

/// Why a game failed validation. The cause is kept structured instead of
/// being collapsed into a single opaque message.
#[derive(Debug)]
pub enum ValidationFailure {
    EmptyField { field: &'static str },
    TokenGeneration(String),
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::EmptyField { field } => write!(f, "field {} is empty", field),
            ValidationFailure::TokenGeneration(msg) => {
                write!(f, "token generation failed: {}", msg)
            }
        }
    }
}

#[derive(Debug)]
pub enum GameServiceError {
    ValidationError(ValidationFailure),
    RepositoryError(InfrastructureError),
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::ValidationError(failure) => {
                write!(f, "Validation error: {}", failure)
            }
            GameServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<InfrastructureError> for GameServiceError {
    fn from(err: InfrastructureError) -> Self {
        GameServiceError::RepositoryError(err)
    }
}
