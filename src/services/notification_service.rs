use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::models::email::EmailMessage;
use crate::models::game::{Game, GameStatus};
use crate::repositories::infrastructure_service::InfrastructureService;
use crate::services::DEFAULT_BASE_URL;

const CANCELED_SUBJECT: &str = "Jogo cancelado";
const CLOSED_SUBJECT: &str = "Jogo encerrado";
const DEFAULT_CONCURRENCY: usize = 16;

/// Fans out one email per member when a game reaches a terminal status.
/// Each dispatch runs on its own tokio task; the semaphore bounds how many
/// dispatches run at once so a burst of cancellations cannot pile up
/// unbounded work.
#[derive(Clone)]
pub struct NotificationDispatcher {
    infrastructure: Arc<dyn InfrastructureService>,
    permits: Arc<Semaphore>,
    base_url: String,
}

impl NotificationDispatcher {
    pub fn new(infrastructure: Arc<dyn InfrastructureService>) -> Self {
        let concurrency = std::env::var("NOTIFICATION_CONCURRENCY")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_CONCURRENCY);
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(infrastructure, base_url, concurrency)
    }

    pub fn with_base_url(
        infrastructure: Arc<dyn InfrastructureService>,
        base_url: String,
        concurrency: usize,
    ) -> Self {
        NotificationDispatcher {
            infrastructure,
            permits: Arc::new(Semaphore::new(concurrency)),
            base_url,
        }
    }

    /// Spawns the notification task for one status change. The returned
    /// handle is a completion signal; callers are free to drop it.
    pub fn dispatch(&self, game: Game, status: GameStatus) -> JoinHandle<()> {
        let infrastructure = Arc::clone(&self.infrastructure);
        let permits = Arc::clone(&self.permits);
        let base_url = self.base_url.clone();
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let subject = match status {
                GameStatus::Canceled => CANCELED_SUBJECT,
                GameStatus::Closed => CLOSED_SUBJECT,
                GameStatus::Active => {
                    warn!(
                        "Notification dispatch requested for game {} with non-terminal status",
                        game.id
                    );
                    return;
                }
            };
            let body = match status {
                GameStatus::Canceled => format!(
                    "Um jogo que você foi convidado foi cancelado. Acesse o link para visualizá-lo: {}/?id={}",
                    base_url, game.id
                ),
                _ => format!(
                    "Um jogo que você foi convidado foi encerrado. Acesse o link para visualizá-lo: {}/?id={}",
                    base_url, game.id
                ),
            };

            let recipients = game
                .confirmed_members
                .iter()
                .flatten()
                .chain(game.unconfirmed_members.iter().flatten());
            for member in recipients {
                let message = EmailMessage::new(subject, &body, &member.email);
                if let Err(e) = infrastructure.send_email(&message).await {
                    error!(
                        "Failed to send '{}' notification for game {} to {}: {}",
                        subject, game.id, member.email, e
                    );
                }
            }
            info!("Finished '{}' notifications for game {}", subject, game.id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::album::Photo;
    use crate::models::member::Member;
    use crate::repositories::errors::infrastructure_service_errors::InfrastructureError;
    use crate::repositories::infrastructure_service::MockInfrastructureService;

    fn game_with_members() -> Game {
        let mut game = Game::new(
            7,
            "Enredo",
            Photo::new(vec![1]),
            "Local",
            "Missão",
            "Objetivo",
        );
        game.confirmed_members = Some(vec![Member::new("a@x.com"), Member::new("b@x.com")]);
        game.unconfirmed_members = Some(vec![Member::new("c@x.com")]);
        game
    }

    fn dispatcher(mock: MockInfrastructureService) -> NotificationDispatcher {
        NotificationDispatcher::with_base_url(
            Arc::new(mock),
            "http://localhost:8080".to_string(),
            4,
        )
    }

    #[tokio::test]
    async fn test_dispatch_sends_one_email_per_member_across_both_lists() {
        let mut mock = MockInfrastructureService::new();
        mock.expect_send_email()
            .withf(|message: &EmailMessage| {
                message.subject == "Jogo cancelado"
                    && message.body.contains("cancelado")
                    && message.body.contains("http://localhost:8080/?id=7")
            })
            .times(3)
            .returning(|_| Box::pin(async { Ok(()) }));

        dispatcher(mock)
            .dispatch(game_with_members(), GameStatus::Canceled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_uses_closing_subject_for_closed_games() {
        let mut mock = MockInfrastructureService::new();
        mock.expect_send_email()
            .withf(|message: &EmailMessage| {
                message.subject == "Jogo encerrado" && message.body.contains("encerrado")
            })
            .times(3)
            .returning(|_| Box::pin(async { Ok(()) }));

        dispatcher(mock)
            .dispatch(game_with_members(), GameStatus::Closed)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_single_send_failure_does_not_stop_the_fan_out() {
        let mut mock = MockInfrastructureService::new();
        mock.expect_send_email()
            .withf(|message: &EmailMessage| message.recipient == "a@x.com")
            .times(1)
            .returning(|_| {
                Box::pin(async { Err(InfrastructureError::DynamoDb("outbox down".to_string())) })
            });
        mock.expect_send_email()
            .times(2)
            .returning(|_| Box::pin(async { Ok(()) }));

        dispatcher(mock)
            .dispatch(game_with_members(), GameStatus::Canceled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_for_active_status_sends_nothing() {
        let mut mock = MockInfrastructureService::new();
        mock.expect_send_email().never();

        dispatcher(mock)
            .dispatch(game_with_members(), GameStatus::Active)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_with_absent_member_lists_sends_nothing() {
        let mut mock = MockInfrastructureService::new();
        mock.expect_send_email().never();

        let game = Game::new(
            9,
            "Enredo",
            Photo::new(vec![1]),
            "Local",
            "Missão",
            "Objetivo",
        );
        dispatcher(mock)
            .dispatch(game, GameStatus::Canceled)
            .await
            .unwrap();
    }
}
