use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::game_session::{Outcome, Side};
use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::rating_service_errors::RatingServiceError;

pub const K_FACTOR: f64 = 32.0;

/// Standard logistic Elo expectation with a fixed K-factor.
#[derive(Debug, Clone, Copy)]
pub struct EloCalculator {
    k_factor: f64,
}

impl Default for EloCalculator {
    fn default() -> Self {
        EloCalculator { k_factor: K_FACTOR }
    }
}

impl EloCalculator {
    /// Expected score of a player rated `rating` against `opponent_rating`.
    pub fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
        1.0 / (1.0 + 10f64.powf((opponent_rating - rating) as f64 / 400.0))
    }

    /// New `(white, black)` ratings, or `None` for outcomes that are not rated.
    pub fn new_ratings(&self, white: i32, black: i32, outcome: &Outcome) -> Option<(i32, i32)> {
        let white_score = match outcome {
            Outcome::WhiteWins => 1.0,
            Outcome::BlackWins => 0.0,
            Outcome::Draw(_) => 0.5,
            Outcome::Pending | Outcome::Aborted => return None,
        };
        let black_score = 1.0 - white_score;

        let adjust = |rating: i32, opponent: i32, score: f64| {
            let expected = Self::expected_score(rating, opponent);
            (rating as f64 + self.k_factor * (score - expected)).round() as i32
        };

        Some((
            adjust(white, black, white_score),
            adjust(black, white, black_score),
        ))
    }
}

/// Applies a finished game's result to both players' profiles.
///
/// A player's profile is read, adjusted and written back while that
/// player's lock is held.
pub struct RatingService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    calculator: EloCalculator,
    player_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl RatingService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        RatingService {
            repository,
            calculator: EloCalculator::default(),
            player_locks: DashMap::new(),
        }
    }

    fn player_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.player_locks
            .entry(user_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Drops the lock entry once no other update is waiting on it.
    fn release_player_lock(&self, user_id: &str) {
        self.player_locks
            .remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Reads a profile, creating a default one for players never seen before.
    async fn load_or_create(&self, user_id: &str) -> Result<User, RatingServiceError> {
        match self.repository.get_user_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(UserRepositoryError::NotFound) => {
                let user = User::with_id(user_id);
                match self.repository.create_user(&user).await {
                    Ok(()) => {
                        info!("Created default profile for {}", user_id);
                        Ok(user)
                    }
                    Err(UserRepositoryError::AlreadyExists) => {
                        Ok(self.repository.get_user_by_id(user_id).await?)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Updates ratings and win/loss/draw counters. Returns the new
    /// `(white, black)` ratings, or `None` when the outcome is not rated.
    /// Players without a profile get a default one first.
    pub async fn apply_result(
        &self,
        white_player_id: &str,
        black_player_id: &str,
        outcome: &Outcome,
    ) -> Result<Option<(i32, i32)>, RatingServiceError> {
        if !matches!(
            outcome,
            Outcome::WhiteWins | Outcome::BlackWins | Outcome::Draw(_)
        ) {
            return Ok(None);
        }

        // Sorted order keeps overlapping pairs from deadlocking.
        let mut ids = vec![white_player_id, black_player_id];
        ids.sort_unstable();
        ids.dedup();
        let locks: Vec<Arc<Mutex<()>>> = ids.iter().map(|id| self.player_lock(id)).collect();

        let result = {
            let mut guards = Vec::with_capacity(locks.len());
            for lock in &locks {
                guards.push(lock.lock().await);
            }
            self.update_profiles(white_player_id, black_player_id, outcome)
                .await
        };

        drop(locks);
        for id in ids {
            self.release_player_lock(id);
        }
        result
    }

    async fn update_profiles(
        &self,
        white_player_id: &str,
        black_player_id: &str,
        outcome: &Outcome,
    ) -> Result<Option<(i32, i32)>, RatingServiceError> {
        let mut white = self.load_or_create(white_player_id).await?;
        let mut black = self.load_or_create(black_player_id).await?;

        let Some((white_rating, black_rating)) =
            self.calculator
                .new_ratings(white.rating, black.rating, outcome)
        else {
            return Ok(None);
        };

        match outcome.winner() {
            Some(Side::White) => {
                white.wins += 1;
                black.losses += 1;
            }
            Some(Side::Black) => {
                black.wins += 1;
                white.losses += 1;
            }
            None => {
                white.draws += 1;
                black.draws += 1;
            }
        }
        white.rating = white_rating;
        black.rating = black_rating;

        self.repository.update_user(&white).await?;
        self.repository.update_user(&black).await?;

        info!(
            "Ratings updated: {} -> {}, {} -> {}",
            white.id, white_rating, black.id, black_rating
        );
        Ok(Some((white_rating, black_rating)))
    }
}
