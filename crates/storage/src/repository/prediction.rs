use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::results::LeaderboardRow;
use crate::dto::standings::StandingRow;
use crate::dto::stats::MemberStats;
use crate::error::{Result, StorageError};
use crate::models::Prediction;

pub(crate) const PREDICTION_COLUMNS: &str = "prediction_id, user_id, game_id, group_id, \
     home_score, away_score, delta, rank, won_wager, created_at, updated_at";

/// Repository for Prediction database operations
pub struct PredictionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PredictionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, prediction_id: Uuid) -> Result<Prediction> {
        let prediction = sqlx::query_as::<_, Prediction>(&format!(
            "SELECT {PREDICTION_COLUMNS} FROM predictions WHERE prediction_id = $1"
        ))
        .bind(prediction_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(prediction)
    }

    /// Settled predictions of a game within a group, best first
    pub async fn list_leaderboard(&self, game_id: Uuid, group_id: Uuid) -> Result<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT p.prediction_id, p.user_id, COALESCE(u.nickname, u.name) AS name,
                   p.home_score, p.away_score, p.delta, p.rank, p.won_wager
            FROM predictions p
            INNER JOIN users u ON u.user_id = p.user_id
            WHERE p.game_id = $1 AND p.group_id = $2
            ORDER BY p.rank ASC NULLS LAST, p.created_at, p.prediction_id
            "#,
        )
        .bind(game_id)
        .bind(group_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Season statistics for one member, counting finished games only
    pub async fn member_stats(&self, group_id: Uuid, user_id: Uuid) -> Result<MemberStats> {
        let stats = sqlx::query_as::<_, MemberStats>(
            r#"
            SELECT
                COUNT(p.delta) AS total_predictions,
                COUNT(*) FILTER (WHERE p.won_wager) AS wager_wins,
                AVG(p.delta)::DOUBLE PRECISION AS average_delta,
                COUNT(*) FILTER (WHERE p.delta = 0) AS perfect_predictions,
                COUNT(*) FILTER (WHERE p.rank = 1) AS first_place_finishes
            FROM predictions p
            INNER JOIN games g ON g.game_id = p.game_id
            WHERE p.user_id = $1
              AND p.group_id = $2
              AND g.status = 'finished'
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Season table of a group: every member with wager wins, settled
    /// predictions and average delta over finished games. Most wager wins
    /// first, lower average delta breaking ties.
    pub async fn group_leaderboard(&self, group_id: Uuid, season: i32) -> Result<Vec<StandingRow>> {
        let rows = sqlx::query_as::<_, StandingRow>(
            r#"
            SELECT
                m.user_id,
                COALESCE(u.nickname, u.name) AS name,
                m.wager_opt_in,
                COUNT(p.prediction_id) FILTER (WHERE p.won_wager) AS wager_wins,
                COUNT(p.delta) AS total_predictions,
                AVG(p.delta)::DOUBLE PRECISION AS average_delta
            FROM memberships m
            INNER JOIN users u ON u.user_id = m.user_id
            LEFT JOIN (
                predictions p
                INNER JOIN games g
                    ON g.game_id = p.game_id
                   AND g.status = 'finished'
                   AND g.season = $2
            ) ON p.user_id = m.user_id AND p.group_id = m.group_id
            WHERE m.group_id = $1
            GROUP BY m.user_id, u.nickname, u.name, m.wager_opt_in
            ORDER BY wager_wins DESC, average_delta ASC NULLS LAST, name, m.user_id
            "#,
        )
        .bind(group_id)
        .bind(season)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
