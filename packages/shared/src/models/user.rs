use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_RATING: i32 = 1200;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, nickname: String) -> Self {
        User {
            id: Uuid::new_v4().to_string(),
            email,
            nickname,
            rating: DEFAULT_RATING,
            wins: 0,
            losses: 0,
            draws: 0,
            created_at: Utc::now(),
        }
    }

    /// Default profile for a player known only by id. The blank nickname
    /// makes display names fall back to the id.
    pub fn with_id(id: &str) -> Self {
        User {
            id: id.to_string(),
            ..User::new(String::new(), String::new())
        }
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Wins over decisive games; draws do not count.
    pub fn win_rate(&self) -> f64 {
        let decisive = self.wins + self.losses;
        if decisive == 0 {
            return 0.0;
        }
        self.wins as f64 / decisive as f64
    }
}
