use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::settlement::SettlementResponse;
use crate::models::{Prediction, Score};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OverridePredictionRequest {
    #[validate(range(min = 0, message = "home_score must be >= 0"))]
    pub home_score: i32,
    #[validate(range(min = 0, message = "away_score must be >= 0"))]
    pub away_score: i32,
}

impl OverridePredictionRequest {
    pub fn score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OverridePredictionResponse {
    pub prediction: Prediction,
    /// Present when the game was already finished and got re-settled
    pub settlement: Option<SettlementResponse>,
}
