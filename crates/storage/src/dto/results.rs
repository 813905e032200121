use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Game, Score};
use crate::services::notifications::{format_delta, rank_display};

/// Raw leaderboard row as read from the database
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub home_score: i32,
    pub away_score: i32,
    pub delta: Option<i64>,
    pub rank: Option<i32>,
    pub won_wager: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub predicted: Score,
    pub delta: Option<i64>,
    pub rank: Option<i32>,
    pub won_wager: bool,
    /// "1st", "2nd"... or "-" before settlement
    pub rank_display: String,
    /// "Perfect!", "3 off" or "-" before settlement
    pub delta_display: String,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        let rank_text = row
            .rank
            .and_then(|r| u32::try_from(r).ok())
            .map_or_else(|| "-".to_string(), rank_display);
        let delta_text = format_delta(row.delta.and_then(|d| u64::try_from(d).ok()));

        Self {
            prediction_id: row.prediction_id,
            user_id: row.user_id,
            name: row.name,
            predicted: Score::new(row.home_score, row.away_score),
            delta: row.delta,
            rank: row.rank,
            won_wager: row.won_wager,
            rank_display: rank_text,
            delta_display: delta_text,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameResultsResponse {
    pub game: Game,
    pub group_id: Uuid,
    pub group_name: String,
    pub prize: Option<String>,
    pub entries: Vec<LeaderboardEntry>,
}
