use serde::{Deserialize, Serialize};

use crate::models::game::Game;

/// One page of games, ordered by id, with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePage {
    pub games: Vec<Game>,
    pub page: u32,
    pub page_size: u32,
    pub total_games: u64,
}
