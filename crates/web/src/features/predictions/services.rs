use sqlx::PgPool;
use storage::{
    models::{Prediction, Score},
    services::{
        corrections,
        settlement::{SettlementError, SettlementResult},
    },
};
use uuid::Uuid;

/// Admin correction of a stored prediction. The edit and, for a finished
/// game, the re-settlement of its group commit together.
pub async fn override_prediction(
    pool: &PgPool,
    prediction_id: Uuid,
    score: Score,
) -> Result<(Prediction, Option<SettlementResult>), SettlementError> {
    corrections::override_and_store(pool, prediction_id, score).await
}
