use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_dynamo::{from_item, to_attribute_value, to_item};
use tracing::info;
use uuid::Uuid;

use crate::models::album::PhotoAlbum;
use crate::models::email::EmailMessage;
use crate::models::game::Game;
use crate::models::member::Member;
use crate::models::page::GamePage;
use crate::repositories::errors::infrastructure_service_errors::InfrastructureError;

#[cfg(test)]
use mockall::automock;

/// The infrastructure collaborator consumed by the services. Absent entities
/// are reported as `None`, not as errors.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait InfrastructureService: Send + Sync {
    async fn add_game(&self, game: &Game) -> Result<(), InfrastructureError>;
    async fn get_game(&self, id: u64) -> Result<Option<Game>, InfrastructureError>;
    async fn get_game_by_token(&self, token: &str) -> Result<Option<Game>, InfrastructureError>;
    async fn get_member(&self, email: &str) -> Result<Option<Member>, InfrastructureError>;
    async fn add_members_to_game(
        &self,
        game_id: u64,
        members: &[Member],
    ) -> Result<(), InfrastructureError>;
    async fn update_game(&self, game: &Game) -> Result<(), InfrastructureError>;
    async fn get_game_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<GamePage, InfrastructureError>;
    async fn create_album(&self, album: &PhotoAlbum) -> Result<(), InfrastructureError>;
    async fn send_email(&self, message: &EmailMessage) -> Result<(), InfrastructureError>;
}

pub struct DynamoDbInfrastructureService {
    pub client: Client,
    pub games_table: String,
    pub members_table: String,
    pub albums_table: String,
    pub outbox_table: String,
}

/// Email delivery is out of scope here: outgoing messages are enqueued into
/// the outbox table and picked up downstream.
#[derive(Serialize)]
struct OutboxEntry {
    id: String,
    queued_at: DateTime<Utc>,
    subject: String,
    body: String,
    recipient: String,
}

impl DynamoDbInfrastructureService {
    pub fn new(client: Client) -> Self {
        let games_table =
            std::env::var("GAMES_TABLE").expect("GAMES_TABLE environment variable must be set");
        let members_table =
            std::env::var("MEMBERS_TABLE").expect("MEMBERS_TABLE environment variable must be set");
        let albums_table =
            std::env::var("ALBUMS_TABLE").expect("ALBUMS_TABLE environment variable must be set");
        let outbox_table = std::env::var("EMAIL_OUTBOX_TABLE")
            .expect("EMAIL_OUTBOX_TABLE environment variable must be set");
        Self {
            client,
            games_table,
            members_table,
            albums_table,
            outbox_table,
        }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config))
    }

    pub fn with_tables(
        client: Client,
        games_table: String,
        members_table: String,
        albums_table: String,
        outbox_table: String,
    ) -> Self {
        Self {
            client,
            games_table,
            members_table,
            albums_table,
            outbox_table,
        }
    }
}

#[async_trait]
impl InfrastructureService for DynamoDbInfrastructureService {
    async fn add_game(&self, game: &Game) -> Result<(), InfrastructureError> {
        let item =
            to_item(game).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.games_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_game(&self, id: u64) -> Result<Option<Game>, InfrastructureError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.games_table)
            .key(
                "id",
                to_attribute_value(id)
                    .map_err(|e| InfrastructureError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        if let Some(item) = output.item {
            let game: Game =
                from_item(item).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
            Ok(Some(game))
        } else {
            Ok(None)
        }
    }

    async fn get_game_by_token(&self, token: &str) -> Result<Option<Game>, InfrastructureError> {
        let result = self
            .client
            .query()
            .table_name(&self.games_table)
            .index_name("GSI_GameByToken")
            .key_condition_expression("#token = :token")
            .expression_attribute_names("#token", "token")
            .expression_attribute_values(
                ":token",
                to_attribute_value(token)
                    .map_err(|e| InfrastructureError::Serialization(e.to_string()))?,
            )
            .send()
            .await;
        match result {
            Ok(output) => {
                if let Some(item) = output.items.unwrap_or_default().into_iter().next() {
                    let game: Game = from_item(item)
                        .map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
                    Ok(Some(game))
                } else {
                    Ok(None)
                }
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("ResourceNotFoundException")
                    || error_str.contains("ValidationException")
                {
                    return Err(InfrastructureError::DynamoDb(
                        "Game token index not available. Please ensure the GSI 'GSI_GameByToken' exists and is active.".to_string(),
                    ));
                }
                Err(InfrastructureError::DynamoDb(error_str))
            }
        }
    }

    async fn get_member(&self, email: &str) -> Result<Option<Member>, InfrastructureError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.members_table)
            .key(
                "email",
                to_attribute_value(email)
                    .map_err(|e| InfrastructureError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        if let Some(item) = output.item {
            let member: Member =
                from_item(item).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
            Ok(Some(member))
        } else {
            Ok(None)
        }
    }

    async fn add_members_to_game(
        &self,
        game_id: u64,
        members: &[Member],
    ) -> Result<(), InfrastructureError> {
        // Read-modify-write on the unconfirmed list; emails already present
        // are not appended twice.
        let mut game = match self.get_game(game_id).await? {
            Some(game) => game,
            None => return Ok(()),
        };
        let unconfirmed = game.unconfirmed_members.get_or_insert_with(Vec::new);
        for member in members {
            if !unconfirmed.iter().any(|m| m.email == member.email) {
                unconfirmed.push(member.clone());
            }
        }
        let item =
            to_item(&game).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.games_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn update_game(&self, game: &Game) -> Result<(), InfrastructureError> {
        let item =
            to_item(game).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.games_table)
            .set_item(Some(item))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn get_game_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<GamePage, InfrastructureError> {
        // Full scan, then sort and slice. The game tables this service works
        // with are small; a keyed pagination scheme is not worth the extra
        // table design here.
        let mut items = Vec::new();
        let mut last_key = None;
        loop {
            let mut request = self.client.scan().table_name(&self.games_table);
            if let Some(key) = last_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }
            let output = request
                .send()
                .await
                .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
            if let Some(batch) = output.items {
                items.extend(batch);
            }
            match output.last_evaluated_key {
                Some(key) => last_key = Some(key),
                None => break,
            }
        }

        let mut games = items
            .into_iter()
            .map(|item| {
                from_item(item).map_err(|e| InfrastructureError::Serialization(e.to_string()))
            })
            .collect::<Result<Vec<Game>, _>>()?;
        games.sort_by_key(|game| game.id);

        let total_games = games.len() as u64;
        let start = page.saturating_sub(1) as usize * page_size as usize;
        let games = games
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();
        Ok(GamePage {
            games,
            page,
            page_size,
            total_games,
        })
    }

    async fn create_album(&self, album: &PhotoAlbum) -> Result<(), InfrastructureError> {
        let item =
            to_item(album).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.albums_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        Ok(())
    }

    async fn send_email(&self, message: &EmailMessage) -> Result<(), InfrastructureError> {
        let entry = OutboxEntry {
            id: Uuid::new_v4().to_string(),
            queued_at: Utc::now(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            recipient: message.recipient.clone(),
        };
        let item =
            to_item(&entry).map_err(|e| InfrastructureError::Serialization(e.to_string()))?;
        self.client
            .put_item()
            .table_name(&self.outbox_table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| InfrastructureError::DynamoDb(e.to_string()))?;
        info!("Queued email '{}' for {}", entry.subject, entry.recipient);
        Ok(())
    }
}
