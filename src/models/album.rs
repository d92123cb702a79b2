use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(bytes: Vec<u8>) -> Self {
        Photo { bytes }
    }
}

/// A photo album attached to a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoAlbum {
    pub id: String,
    pub game_id: u64,
    pub title: String,
    pub photos: Vec<Photo>,
}

impl PhotoAlbum {
    pub fn new(game_id: u64, title: &str, photos: Vec<Photo>) -> Self {
        PhotoAlbum {
            id: Uuid::new_v4().to_string(),
            game_id,
            title: title.to_string(),
            photos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_ids_are_unique() {
        let album1 = PhotoAlbum::new(1, "Final", vec![]);
        let album2 = PhotoAlbum::new(1, "Final", vec![]);

        assert_ne!(album1.id, album2.id);
        assert_eq!(album1.game_id, album2.game_id);
    }
}
