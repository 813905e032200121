use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Score;
use crate::services::settlement::{ResettleSummary, SettledPrediction, SettlementResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettledPredictionResponse {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub delta: u64,
    pub rank: u32,
    pub picked_winner: bool,
    pub won_wager: bool,
}

impl From<&SettledPrediction> for SettledPredictionResponse {
    fn from(entry: &SettledPrediction) -> Self {
        Self {
            prediction_id: entry.prediction_id,
            user_id: entry.user_id,
            delta: entry.delta,
            rank: entry.rank,
            picked_winner: entry.picked_winner,
            won_wager: entry.won_wager,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettlementResponse {
    pub game_id: Uuid,
    pub group_id: Uuid,
    pub final_score: Score,
    pub wager_winner_prediction_id: Option<Uuid>,
    pub predictions: Vec<SettledPredictionResponse>,
}

impl From<&SettlementResult> for SettlementResponse {
    fn from(result: &SettlementResult) -> Self {
        Self {
            game_id: result.game_id,
            group_id: result.group_id,
            final_score: result.final_score,
            wager_winner_prediction_id: result.wager.winning_prediction(),
            predictions: result
                .entries
                .iter()
                .map(SettledPredictionResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResettleSummaryResponse {
    pub settled: u64,
    pub deferred: u64,
    pub failed: u64,
}

impl From<ResettleSummary> for ResettleSummaryResponse {
    fn from(summary: ResettleSummary) -> Self {
        Self {
            settled: summary.settled,
            deferred: summary.deferred,
            failed: summary.failed,
        }
    }
}
