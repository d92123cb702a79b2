use serde::{Deserialize, Serialize};

use crate::models::album::Photo;
use crate::models::member::Member;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Canceled,
    Closed,
}

/// A jogo: an organized event with a plot, a location, a mission and an
/// objective. Status and token stay unset until the game is saved; the
/// membership lists stay absent until members are invited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub plot: String,
    pub photo: Photo,
    pub location: String,
    pub mission: String,
    pub objective: String,
    #[serde(default)]
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub confirmed_members: Option<Vec<Member>>,
    #[serde(default)]
    pub unconfirmed_members: Option<Vec<Member>>,
}

impl Game {
    pub fn new(
        id: u64,
        plot: &str,
        photo: Photo,
        location: &str,
        mission: &str,
        objective: &str,
    ) -> Self {
        Game {
            id,
            plot: plot.to_string(),
            photo,
            location: location.to_string(),
            mission: mission.to_string(),
            objective: objective.to_string(),
            status: None,
            token: None,
            confirmed_members: None,
            unconfirmed_members: None,
        }
    }
}
