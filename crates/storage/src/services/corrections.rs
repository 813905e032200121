use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::settlement::{self, SettlementError, SettlementGateway, SettlementResult};
use crate::error::Result;
use crate::models::{Prediction, Score};
use crate::repository::{prediction::PredictionRepository, settlement::PgSettlementGateway};

/// Prediction edits made inside a settlement pass, so the edit and the
/// re-ranking it triggers land together.
#[async_trait]
pub trait CorrectionGateway: SettlementGateway {
    /// `StorageError::NotFound` when the prediction does not exist
    async fn override_prediction(&mut self, prediction_id: Uuid, score: Score) -> Result<Prediction>;

    async fn load_prediction(&mut self, prediction_id: Uuid) -> Result<Prediction>;
}

/// Replaces a stored prediction's score. A finished game is re-settled in
/// full right away; otherwise only the score changes and settlement waits
/// for the final result.
pub async fn override_prediction<G>(
    gateway: &mut G,
    prediction_id: Uuid,
    score: Score,
) -> std::result::Result<(Prediction, Option<SettlementResult>), SettlementError>
where
    G: CorrectionGateway + ?Sized,
{
    let prediction = gateway.override_prediction(prediction_id, score).await?;
    tracing::info!(
        %prediction_id,
        game_id = %prediction.game_id,
        group_id = %prediction.group_id,
        home = score.home,
        away = score.away,
        "Prediction overridden"
    );

    let settlement =
        settlement::settle_if_finished(gateway, prediction.game_id, prediction.group_id).await?;
    if settlement.is_none() {
        return Ok((prediction, None));
    }

    // Rank, delta and wager flag changed with the pass.
    let prediction = gateway.load_prediction(prediction_id).await?;

    Ok((prediction, settlement))
}

/// Runs [`override_prediction`] in one locked transaction on the
/// prediction's (game, group) pair.
pub async fn override_and_store(
    pool: &PgPool,
    prediction_id: Uuid,
    score: Score,
) -> std::result::Result<(Prediction, Option<SettlementResult>), SettlementError> {
    let current = PredictionRepository::new(pool).find_by_id(prediction_id).await?;

    let mut gateway = PgSettlementGateway::begin(pool, current.game_id, current.group_id).await?;
    let outcome = override_prediction(&mut gateway, prediction_id, score).await?;
    gateway.commit().await?;

    Ok(outcome)
}
