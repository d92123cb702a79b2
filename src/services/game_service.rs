use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::album::PhotoAlbum;
use crate::models::email::EmailMessage;
use crate::models::game::{Game, GameStatus};
use crate::models::page::GamePage;
use crate::repositories::infrastructure_service::InfrastructureService;
use crate::services::errors::game_service_errors::{GameServiceError, ValidationFailure};
use crate::services::notification_service::NotificationDispatcher;
use crate::services::DEFAULT_BASE_URL;
use crate::utils::code_generator::TokenGenerator;

const PAGE_SIZE: u32 = 5;
const TOKEN_LENGTH: usize = 8;
const INVITE_SUBJECT: &str = "Você foi adicionado a um novo jogo";

/// Orchestrates the game business rules: validation on save, membership
/// invitations and confirmations, pagination and the lifecycle transitions
/// that trigger notifications.
pub struct GameService {
    infrastructure: Arc<dyn InfrastructureService>,
    token_generator: Arc<dyn TokenGenerator>,
    dispatcher: NotificationDispatcher,
    base_url: String,
}

impl GameService {
    pub fn new(
        infrastructure: Arc<dyn InfrastructureService>,
        token_generator: Arc<dyn TokenGenerator>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(infrastructure, token_generator, dispatcher, base_url)
    }

    pub fn with_base_url(
        infrastructure: Arc<dyn InfrastructureService>,
        token_generator: Arc<dyn TokenGenerator>,
        dispatcher: NotificationDispatcher,
        base_url: String,
    ) -> Self {
        GameService {
            infrastructure,
            token_generator,
            dispatcher,
            base_url,
        }
    }

    /// Validates the game, defaults its status to Active, assigns its token
    /// and persists it. Nothing is persisted when validation fails.
    pub async fn save_game(&self, mut game: Game) -> Result<Game, GameServiceError> {
        self.apply_save_rules(&mut game)
            .map_err(GameServiceError::ValidationError)?;
        self.infrastructure.add_game(&game).await?;
        info!("Saved game {} with token {:?}", game.id, game.token);
        Ok(game)
    }

    pub async fn get_game(&self, id: u64) -> Result<Option<Game>, GameServiceError> {
        self.infrastructure
            .get_game(id)
            .await
            .map_err(GameServiceError::from)
    }

    pub async fn get_game_by_token(&self, token: &str) -> Result<Option<Game>, GameServiceError> {
        self.infrastructure
            .get_game_by_token(token)
            .await
            .map_err(GameServiceError::from)
    }

    /// Invites members to a game by email. Emails with no registered member
    /// are skipped; everyone found is emailed a confirmation link and then
    /// persisted as unconfirmed in a single batch call.
    pub async fn invite_members(
        &self,
        game_id: u64,
        emails: &[String],
    ) -> Result<(), GameServiceError> {
        let game = match self.infrastructure.get_game(game_id).await? {
            Some(game) => game,
            None => {
                warn!("Game {} not found, no invitations sent", game_id);
                return Ok(());
            }
        };
        let token = match game.token.clone() {
            Some(token) => token,
            None => {
                warn!(
                    "Game {} has no token, invitation links will carry an empty code",
                    game_id
                );
                String::new()
            }
        };

        let mut members = Vec::new();
        for email in emails {
            match self.infrastructure.get_member(email).await? {
                Some(member) => {
                    let body = format!(
                        "Você foi convidado a participar de um novo jogo para confirmar sua participação acesse o link: {}/jogos/jogo/confirmar/{}?email={}",
                        self.base_url, token, email
                    );
                    let message = EmailMessage::new(INVITE_SUBJECT, &body, email);
                    // One failed invite email does not stop the remaining
                    // invitations; the member is still registered.
                    if let Err(e) = self.infrastructure.send_email(&message).await {
                        warn!("Failed to send invitation to {}: {}", email, e);
                    }
                    members.push(member);
                }
                None => {
                    info!("No member registered for {}, skipping invite", email);
                }
            }
        }
        self.infrastructure
            .add_members_to_game(game_id, &members)
            .await?;
        Ok(())
    }

    pub async fn get_page(&self, page: u32) -> Result<GamePage, GameServiceError> {
        self.infrastructure
            .get_game_page(page, PAGE_SIZE)
            .await
            .map_err(GameServiceError::from)
    }

    pub async fn create_album(&self, album: &PhotoAlbum) -> Result<(), GameServiceError> {
        self.infrastructure
            .create_album(album)
            .await
            .map_err(GameServiceError::from)
    }

    /// Moves a member from the unconfirmed to the confirmed list. A missing
    /// game, a missing member or a member that was never invited (or already
    /// confirmed) is a silent no-op.
    pub async fn confirm_member(&self, email: &str, token: &str) -> Result<(), GameServiceError> {
        let mut game = match self.infrastructure.get_game_by_token(token).await? {
            Some(game) => game,
            None => {
                warn!("No game matches token {}, confirmation ignored", token);
                return Ok(());
            }
        };
        let member = match self.infrastructure.get_member(email).await? {
            Some(member) => member,
            None => return Ok(()),
        };
        let unconfirmed = match game.unconfirmed_members.as_mut() {
            Some(list) => list,
            None => return Ok(()),
        };
        let position = unconfirmed.iter().position(|m| m.email == member.email);
        if let Some(index) = position {
            let member = unconfirmed.remove(index);
            game.confirmed_members
                .get_or_insert_with(Vec::new)
                .push(member);
            self.infrastructure.update_game(&game).await?;
            info!("Member {} confirmed for game {}", email, game.id);
        }
        Ok(())
    }

    pub async fn cancel_game(&self, game_id: u64) -> Result<(), GameServiceError> {
        self.transition_game(game_id, GameStatus::Canceled).await
    }

    pub async fn close_game(&self, game_id: u64) -> Result<(), GameServiceError> {
        self.transition_game(game_id, GameStatus::Closed).await
    }

    // The new status is persisted before any notification goes out. The
    // dispatch handle is deliberately dropped: completion is not observed
    // here. There is no terminal-state guard; cancelling an already-canceled
    // game persists and notifies again, as the original rules do.
    async fn transition_game(
        &self,
        game_id: u64,
        status: GameStatus,
    ) -> Result<(), GameServiceError> {
        let mut game = match self.infrastructure.get_game(game_id).await? {
            Some(game) => game,
            None => {
                warn!("Game {} not found, nothing to transition", game_id);
                return Ok(());
            }
        };
        game.status = Some(status);
        self.infrastructure.update_game(&game).await?;
        info!("Game {} moved to {:?}", game_id, status);
        let _ = self.dispatcher.dispatch(game, status);
        Ok(())
    }

    fn apply_save_rules(&self, game: &mut Game) -> Result<(), ValidationFailure> {
        if game.plot.is_empty() {
            return Err(ValidationFailure::EmptyField { field: "plot" });
        }
        if game.photo.bytes.is_empty() {
            return Err(ValidationFailure::EmptyField { field: "photo" });
        }
        if game.location.is_empty() {
            return Err(ValidationFailure::EmptyField { field: "location" });
        }
        if game.mission.is_empty() {
            return Err(ValidationFailure::EmptyField { field: "mission" });
        }
        if game.objective.is_empty() {
            return Err(ValidationFailure::EmptyField { field: "objective" });
        }
        if game.status.is_none() {
            game.status = Some(GameStatus::Active);
        }
        let token = self
            .token_generator
            .generate_code(
                "",
                TOKEN_LENGTH,
                &game.objective,
                Utc::now().timestamp_millis(),
            )
            .map_err(|e| ValidationFailure::TokenGeneration(e.to_string()))?;
        game.token = Some(token);
        Ok(())
    }
}
