use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::game::GAME_COLUMNS;
use super::prediction::PREDICTION_COLUMNS;
use crate::error::{Result, StorageError};
use crate::models::{Game, Prediction, Score, WagerFlag};
use crate::services::corrections::CorrectionGateway;
use crate::services::settlement::{SettlementGateway, SettlementResult, SettlementStatus};

fn lock_key(game_id: Uuid, group_id: Uuid) -> String {
    format!("settlement:{game_id}:{group_id}")
}

/// Postgres-backed settlement pass.
///
/// Holds one transaction and a transaction-scoped advisory lock on the
/// (game, group) pair, so concurrent passes for the same pair run one after
/// the other while other pairs proceed in parallel. Dropping the gateway
/// without `commit` rolls everything back.
pub struct PgSettlementGateway {
    tx: Transaction<'static, Postgres>,
    game_id: Uuid,
    group_id: Uuid,
}

impl PgSettlementGateway {
    pub async fn begin(pool: &PgPool, game_id: Uuid, group_id: Uuid) -> Result<Self> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(lock_key(game_id, group_id))
            .execute(&mut *tx)
            .await?;

        Ok(Self {
            tx,
            game_id,
            group_id,
        })
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    fn ensure_locked(&self, game_id: Uuid, group_id: Uuid) -> Result<()> {
        if game_id == self.game_id && group_id == self.group_id {
            Ok(())
        } else {
            Err(StorageError::ConstraintViolation(format!(
                "settlement lock held for {}, not {}",
                lock_key(self.game_id, self.group_id),
                lock_key(game_id, group_id)
            )))
        }
    }
}

#[async_trait]
impl SettlementGateway for PgSettlementGateway {
    async fn load_game(&mut self, game_id: Uuid) -> Result<Game> {
        let game = sqlx::query_as::<_, Game>(&format!(
            "SELECT {GAME_COLUMNS} FROM games WHERE game_id = $1"
        ))
        .bind(game_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(game)
    }

    async fn load_predictions(&mut self, game_id: Uuid, group_id: Uuid) -> Result<Vec<Prediction>> {
        self.ensure_locked(game_id, group_id)?;

        let predictions = sqlx::query_as::<_, Prediction>(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE game_id = $1 AND group_id = $2
            ORDER BY created_at, prediction_id
            "#
        ))
        .bind(game_id)
        .bind(group_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(predictions)
    }

    async fn load_wager_flags(&mut self, group_id: Uuid) -> Result<Vec<WagerFlag>> {
        let flags = sqlx::query_as::<_, WagerFlag>(
            r#"
            SELECT user_id, wager_opt_in
            FROM memberships
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(flags)
    }

    async fn settlement_status(&mut self, game_id: Uuid, group_id: Uuid) -> Result<SettlementStatus> {
        let settled = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM settlements WHERE game_id = $1 AND group_id = $2
            )
            "#,
        )
        .bind(game_id)
        .bind(group_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(if settled {
            SettlementStatus::Settled
        } else {
            SettlementStatus::Unsettled
        })
    }

    async fn persist(&mut self, result: &SettlementResult) -> Result<()> {
        self.ensure_locked(result.game_id, result.group_id)?;

        let count = result.entries.len();
        let mut prediction_ids = Vec::with_capacity(count);
        let mut deltas = Vec::with_capacity(count);
        let mut ranks = Vec::with_capacity(count);
        let mut won_wagers = Vec::with_capacity(count);

        for entry in &result.entries {
            prediction_ids.push(entry.prediction_id);
            deltas.push(i64::try_from(entry.delta).map_err(|_| {
                StorageError::ConstraintViolation(format!("delta {} out of range", entry.delta))
            })?);
            ranks.push(i32::try_from(entry.rank).map_err(|_| {
                StorageError::ConstraintViolation(format!("rank {} out of range", entry.rank))
            })?);
            won_wagers.push(entry.won_wager);
        }

        let updated = sqlx::query(
            r#"
            UPDATE predictions AS p
            SET delta = v.delta,
                rank = v.rank,
                won_wager = v.won_wager,
                updated_at = CURRENT_TIMESTAMP
            FROM UNNEST($1::UUID[], $2::BIGINT[], $3::INTEGER[], $4::BOOLEAN[])
                AS v(prediction_id, delta, rank, won_wager)
            WHERE p.prediction_id = v.prediction_id
              AND p.game_id = $5
              AND p.group_id = $6
            "#,
        )
        .bind(prediction_ids)
        .bind(deltas)
        .bind(ranks)
        .bind(won_wagers)
        .bind(result.game_id)
        .bind(result.group_id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if updated != count as u64 {
            return Err(StorageError::ConstraintViolation(format!(
                "settlement wrote {updated} of {count} predictions"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO settlements (game_id, group_id, wager_winner_prediction_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (game_id, group_id)
            DO UPDATE SET
                passes = settlements.passes + 1,
                wager_winner_prediction_id = EXCLUDED.wager_winner_prediction_id,
                last_settled_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(result.game_id)
        .bind(result.group_id)
        .bind(result.wager.winning_prediction())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CorrectionGateway for PgSettlementGateway {
    async fn override_prediction(&mut self, prediction_id: Uuid, score: Score) -> Result<Prediction> {
        // Scoped to the locked pair; a prediction elsewhere reads as missing.
        let prediction = sqlx::query_as::<_, Prediction>(&format!(
            r#"
            UPDATE predictions
            SET home_score = $1, away_score = $2, updated_at = CURRENT_TIMESTAMP
            WHERE prediction_id = $3 AND game_id = $4 AND group_id = $5
            RETURNING {PREDICTION_COLUMNS}
            "#
        ))
        .bind(score.home)
        .bind(score.away)
        .bind(prediction_id)
        .bind(self.game_id)
        .bind(self.group_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(prediction)
    }

    async fn load_prediction(&mut self, prediction_id: Uuid) -> Result<Prediction> {
        let prediction = sqlx::query_as::<_, Prediction>(&format!(
            r#"
            SELECT {PREDICTION_COLUMNS}
            FROM predictions
            WHERE prediction_id = $1 AND game_id = $2 AND group_id = $3
            "#
        ))
        .bind(prediction_id)
        .bind(self.game_id)
        .bind(self.group_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(prediction)
    }
}
