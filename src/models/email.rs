use serde::{Deserialize, Serialize};

/// An outgoing email. Transient: composed by the services and handed to the
/// infrastructure collaborator, never persisted as part of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

impl EmailMessage {
    pub fn new(subject: &str, body: &str, recipient: &str) -> Self {
        EmailMessage {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
        }
    }
}
