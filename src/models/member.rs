use serde::{Deserialize, Serialize};

/// A participant, identified by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub email: String,
}

impl Member {
    pub fn new(email: &str) -> Self {
        Member {
            email: email.to_string(),
        }
    }
}
