use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Game, GameStatus, Score};

pub(crate) const GAME_COLUMNS: &str = "game_id, home_team, away_team, game_time, season, \
     home_score, away_score, status, created_at, updated_at";

/// Repository for Game database operations
pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, game_id: Uuid) -> Result<Game> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE game_id = $1"
        ))
        .bind(game_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(game)
    }

    /// Record the operator-entered final score and mark the game finished
    pub async fn set_final_score(&self, game_id: Uuid, score: Score) -> Result<Game> {
        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            UPDATE games
            SET home_score = $1, away_score = $2, status = $3, updated_at = CURRENT_TIMESTAMP
            WHERE game_id = $4
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(score.home)
        .bind(score.away)
        .bind(GameStatus::Finished.as_str())
        .bind(game_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(game)
    }

    /// Change the status only. Scores and any settlement data stay as they are.
    ///
    /// `finished` is refused with `InvalidState` unless both scores are
    /// present; the check is part of the update itself.
    pub async fn update_status(&self, game_id: Uuid, status: GameStatus) -> Result<Game> {
        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            UPDATE games
            SET status = $1, updated_at = CURRENT_TIMESTAMP
            WHERE game_id = $2
              AND ($1::VARCHAR <> 'finished'
                   OR (home_score IS NOT NULL AND away_score IS NOT NULL))
            RETURNING {GAME_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(game_id)
        .fetch_optional(self.pool)
        .await?;

        match game {
            Some(game) => Ok(game),
            None => {
                // Tell a missing game apart from a refused transition
                self.find_by_id(game_id).await?;
                Err(StorageError::InvalidState(format!(
                    "game {game_id} has no final score and cannot be {status}"
                )))
            }
        }
    }

    /// Groups tracking the game
    pub async fn list_group_ids(&self, game_id: Uuid) -> Result<Vec<Uuid>> {
        let group_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT group_id
            FROM group_games
            WHERE game_id = $1
            ORDER BY created_at, group_id
            "#,
        )
        .bind(game_id)
        .fetch_all(self.pool)
        .await?;

        Ok(group_ids)
    }

    /// Every (game, group) pair whose game is finished with a complete score
    pub async fn list_settleable_pairs(&self, season: Option<i32>) -> Result<Vec<(Uuid, Uuid)>> {
        let pairs = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT g.game_id, gg.group_id
            FROM games g
            INNER JOIN group_games gg ON gg.game_id = g.game_id
            WHERE g.status = 'finished'
              AND g.home_score IS NOT NULL
              AND g.away_score IS NOT NULL
              AND ($1::INTEGER IS NULL OR g.season = $1)
            ORDER BY g.game_time, g.game_id, gg.group_id
            "#,
        )
        .bind(season)
        .fetch_all(self.pool)
        .await?;

        Ok(pairs)
    }
}
