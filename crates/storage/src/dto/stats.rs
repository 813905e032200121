use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// One member's record in a group, over finished games
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
pub struct MemberStats {
    pub total_predictions: i64,
    pub wager_wins: i64,
    pub average_delta: Option<f64>,
    pub perfect_predictions: i64,
    pub first_place_finishes: i64,
}
