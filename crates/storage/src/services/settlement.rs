use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::ranking::{self, Contender};
use super::wager::{self, WagerOutcome};
use crate::error::{Result, StorageError};
use crate::models::{Game, GameStatus, Prediction, Score, WagerFlag};
use crate::repository::game::GameRepository;
use crate::repository::settlement::PgSettlementGateway;

#[derive(Debug, Error)]
pub enum SettlementError {
    /// The game has no complete final score yet. Callers defer settlement.
    #[error("Game {game_id} is not finished; settlement deferred")]
    GameNotFinished { game_id: Uuid },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Settlement state of one (game, group) pair.
///
/// There is no way back to `Unsettled` while the game stays finished; a
/// status correction leaves stored ranks in place for callers to gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Unsettled,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettledPrediction {
    pub prediction_id: Uuid,
    pub user_id: Uuid,
    pub delta: u64,
    pub rank: u32,
    pub picked_winner: bool,
    pub won_wager: bool,
}

/// Output of one recomputation pass, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub game_id: Uuid,
    pub group_id: Uuid,
    pub final_score: Score,
    pub wager: WagerOutcome,
    pub entries: Vec<SettledPrediction>,
}

impl SettlementResult {
    pub fn wager_winner(&self) -> Option<&SettledPrediction> {
        self.entries.iter().find(|entry| entry.won_wager)
    }

    pub fn overall_winner(&self) -> Option<&SettledPrediction> {
        self.entries.first()
    }
}

/// Read/write boundary of a recomputation pass.
///
/// One gateway value covers exactly one pass. Implementations backed by a
/// shared store must hold a lock on the (game, group) pair for the gateway's
/// whole lifetime and apply `persist` atomically.
#[async_trait]
pub trait SettlementGateway: Send {
    /// `StorageError::NotFound` when the game does not exist
    async fn load_game(&mut self, game_id: Uuid) -> Result<Game>;

    /// Predictions in submission order; that order breaks full ties.
    async fn load_predictions(&mut self, game_id: Uuid, group_id: Uuid) -> Result<Vec<Prediction>>;

    async fn load_wager_flags(&mut self, group_id: Uuid) -> Result<Vec<WagerFlag>>;

    async fn settlement_status(&mut self, game_id: Uuid, group_id: Uuid) -> Result<SettlementStatus>;

    async fn persist(&mut self, result: &SettlementResult) -> Result<()>;
}

/// Ranks the predictions of a finished game and resolves the wager.
///
/// Pure: the same game, predictions and flags always give an identical result.
pub fn settle(
    game: &Game,
    group_id: Uuid,
    predictions: &[Prediction],
    flags: &[WagerFlag],
) -> std::result::Result<SettlementResult, SettlementError> {
    let not_finished = || SettlementError::GameNotFinished {
        game_id: game.game_id,
    };

    if game.status != GameStatus::Finished {
        return Err(not_finished());
    }

    let contenders: Vec<Contender> = predictions.iter().map(Contender::from).collect();
    let ranked =
        ranking::rank_predictions(&contenders, game.final_score()).map_err(|_| not_finished())?;
    let final_score = game.final_score().complete().ok_or_else(not_finished)?;

    let opted_in = wager::opted_in_users(flags);
    let outcome = wager::resolve_wager(&ranked, &opted_in);

    let entries = ranked
        .iter()
        .map(|r| SettledPrediction {
            prediction_id: r.prediction_id,
            user_id: r.user_id,
            delta: r.delta,
            rank: r.rank,
            picked_winner: r.picked_winner,
            won_wager: outcome.is_winner(r.prediction_id),
        })
        .collect();

    Ok(SettlementResult {
        game_id: game.game_id,
        group_id,
        final_score,
        wager: outcome,
        entries,
    })
}

/// Re-derives delta, rank and wager outcome for every prediction of a game
/// within a group, then hands the full result to the gateway in one batch.
///
/// Always runs the whole pipeline, so a corrected score or an overridden
/// prediction never leaves stale tie-breaks behind. Nothing is written when
/// the game is not finished or any read fails.
pub async fn recompute<G>(
    gateway: &mut G,
    game_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<SettlementResult, SettlementError>
where
    G: SettlementGateway + ?Sized,
{
    let game = gateway.load_game(game_id).await?;
    if !game.is_settleable() {
        tracing::debug!(%game_id, %group_id, status = %game.status, "Game not settleable yet");
        return Err(SettlementError::GameNotFinished { game_id });
    }

    let predictions = gateway.load_predictions(game_id, group_id).await?;
    let flags = gateway.load_wager_flags(group_id).await?;

    let result = settle(&game, group_id, &predictions, &flags)?;

    let previous = gateway.settlement_status(game_id, group_id).await?;
    gateway.persist(&result).await?;

    match previous {
        SettlementStatus::Unsettled => tracing::info!(
            %game_id,
            %group_id,
            predictions = result.entries.len(),
            wager_winner = ?result.wager.winning_prediction(),
            "Game settled"
        ),
        SettlementStatus::Settled => tracing::info!(
            %game_id,
            %group_id,
            predictions = result.entries.len(),
            wager_winner = ?result.wager.winning_prediction(),
            "Game re-settled"
        ),
    }

    Ok(result)
}

/// Runs one settlement pass in its own transaction and commits it.
pub async fn recompute_and_store(
    pool: &PgPool,
    game_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<SettlementResult, SettlementError> {
    let mut gateway = PgSettlementGateway::begin(pool, game_id, group_id).await?;
    let result = recompute(&mut gateway, game_id, group_id).await?;
    gateway.commit().await?;

    Ok(result)
}

/// Like [`recompute`], but a game that cannot be settled yet is `None`
/// instead of an error. Nothing is written in that case.
pub async fn settle_if_finished<G>(
    gateway: &mut G,
    game_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<Option<SettlementResult>, SettlementError>
where
    G: SettlementGateway + ?Sized,
{
    match recompute(gateway, game_id, group_id).await {
        Ok(result) => Ok(Some(result)),
        Err(SettlementError::GameNotFinished { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Per-group outcome of re-settling one game
#[derive(Debug, Default)]
pub struct GameResettlement {
    pub settled: Vec<SettlementResult>,
    pub deferred: Vec<Uuid>,
    pub failed: Vec<(Uuid, StorageError)>,
}

impl GameResettlement {
    pub fn record(
        &mut self,
        group_id: Uuid,
        outcome: std::result::Result<Option<SettlementResult>, SettlementError>,
    ) {
        match outcome {
            Ok(Some(result)) => self.settled.push(result),
            Ok(None) | Err(SettlementError::GameNotFinished { .. }) => self.deferred.push(group_id),
            Err(SettlementError::Storage(e)) => {
                tracing::error!(%group_id, "Settlement failed: {}", e);
                self.failed.push((group_id, e));
            }
        }
    }

    pub fn failed_group_ids(&self) -> Vec<Uuid> {
        self.failed.iter().map(|(group_id, _)| *group_id).collect()
    }
}

async fn settle_group(
    pool: &PgPool,
    game_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<Option<SettlementResult>, SettlementError> {
    let mut gateway = PgSettlementGateway::begin(pool, game_id, group_id).await?;
    let result = settle_if_finished(&mut gateway, game_id, group_id).await?;
    gateway.commit().await?;

    Ok(result)
}

/// Re-settles a game for every group tracking it.
///
/// Each group commits on its own. A failing group is recorded and the
/// remaining groups still settle; re-running the call retries only what is
/// stale, since recomputation is idempotent.
pub async fn resettle_game(pool: &PgPool, game_id: Uuid) -> Result<GameResettlement> {
    let group_ids = GameRepository::new(pool).list_group_ids(game_id).await?;

    let mut outcome = GameResettlement::default();
    for group_id in group_ids {
        outcome.record(group_id, settle_group(pool, game_id, group_id).await);
    }

    Ok(outcome)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResettleSummary {
    pub settled: u64,
    pub deferred: u64,
    pub failed: u64,
}

/// Re-settles every finished (game, group) pair, optionally for one season.
///
/// Each pair commits independently; a failing pair is logged and counted
/// without stopping the run.
pub async fn resettle_all(pool: &PgPool, season: Option<i32>) -> Result<ResettleSummary> {
    let pairs = GameRepository::new(pool)
        .list_settleable_pairs(season)
        .await?;
    tracing::info!(pairs = pairs.len(), ?season, "Re-settling finished games");

    let mut summary = ResettleSummary::default();
    for (game_id, group_id) in pairs {
        match recompute_and_store(pool, game_id, group_id).await {
            Ok(_) => summary.settled += 1,
            Err(SettlementError::GameNotFinished { .. }) => summary.deferred += 1,
            Err(SettlementError::Storage(e)) => {
                tracing::error!(%game_id, %group_id, "Settlement failed: {}", e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
