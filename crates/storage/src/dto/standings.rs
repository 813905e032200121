use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::notifications::rank_display;

/// One member's season totals as read from the database, best first
#[derive(Debug, Clone, FromRow)]
pub struct StandingRow {
    pub user_id: Uuid,
    pub name: String,
    pub wager_opt_in: bool,
    pub wager_wins: i64,
    pub total_predictions: i64,
    pub average_delta: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingEntry {
    /// 1-based place in the table
    pub position: u32,
    pub position_display: String,
    pub user_id: Uuid,
    pub name: String,
    pub wager_opt_in: bool,
    pub wager_wins: i64,
    pub total_predictions: i64,
    pub average_delta: Option<f64>,
    /// One decimal, or "-" with no finished predictions
    pub average_delta_display: String,
}

/// Numbers rows already sorted by the query.
pub fn number_standings(rows: Vec<StandingRow>) -> Vec<StandingEntry> {
    rows.into_iter()
        .zip(1u32..)
        .map(|(row, position)| StandingEntry {
            position,
            position_display: rank_display(position),
            user_id: row.user_id,
            name: row.name,
            wager_opt_in: row.wager_opt_in,
            wager_wins: row.wager_wins,
            total_predictions: row.total_predictions,
            average_delta: row.average_delta,
            average_delta_display: row
                .average_delta
                .map_or_else(|| "-".to_string(), |d| format!("{d:.1}")),
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupLeaderboardResponse {
    pub group_id: Uuid,
    pub group_name: String,
    pub season: i32,
    pub prize: Option<String>,
    pub standings: Vec<StandingEntry>,
}
