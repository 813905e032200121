use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::score::Score;

/// A member's predicted final score for one game within one group.
///
/// `delta`, `rank` and `won_wager` are written only by settlement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Prediction {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub group_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
    pub delta: Option<i64>,
    pub rank: Option<i32>,
    pub won_wager: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Prediction {
    pub fn predicted_score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }
}
