#[derive(Debug)]
pub enum InfrastructureError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for InfrastructureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfrastructureError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            InfrastructureError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for InfrastructureError {}
