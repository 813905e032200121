use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::settlement::SettlementResponse;
use crate::models::{Game, GameStatus, Score};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetFinalScoreRequest {
    #[validate(range(min = 0, message = "home_score must be >= 0"))]
    pub home_score: i32,
    #[validate(range(min = 0, message = "away_score must be >= 0"))]
    pub away_score: i32,
}

impl SetFinalScoreRequest {
    pub fn score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateGameStatusRequest {
    pub status: GameStatus,
}

/// A game after a score or status change, with the settlement of every
/// group tracking it
#[derive(Debug, Serialize, ToSchema)]
pub struct FinalScoreResponse {
    pub game: Game,
    pub settlements: Vec<SettlementResponse>,
    /// Groups whose settlement failed; repeating the request retries them
    pub failed_group_ids: Vec<Uuid>,
}
