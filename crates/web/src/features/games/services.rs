use sqlx::PgPool;
use storage::{
    dto::results::LeaderboardEntry,
    error::Result,
    models::{Game, GameStatus, Group, Score},
    repository::{game::GameRepository, group::GroupRepository, prediction::PredictionRepository},
    services::settlement::{self, GameResettlement, SettlementError, SettlementResult},
};
use uuid::Uuid;

pub async fn get_game(pool: &PgPool, game_id: Uuid) -> Result<Game> {
    GameRepository::new(pool).find_by_id(game_id).await
}

/// Game, group and the stored leaderboard in rank order
pub async fn get_game_results(
    pool: &PgPool,
    game_id: Uuid,
    group_id: Uuid,
) -> Result<(Game, Group, Vec<LeaderboardEntry>)> {
    let game = GameRepository::new(pool).find_by_id(game_id).await?;
    let group = GroupRepository::new(pool).find_by_id(group_id).await?;
    let rows = PredictionRepository::new(pool)
        .list_leaderboard(game_id, group_id)
        .await?;

    Ok((game, group, rows.into_iter().map(LeaderboardEntry::from).collect()))
}

/// Store the final score, then re-settle every group tracking the game.
///
/// The score is committed first. Groups that fail to settle are reported
/// back; submitting the same score again retries them.
pub async fn set_final_score(
    pool: &PgPool,
    game_id: Uuid,
    score: Score,
) -> Result<(Game, GameResettlement)> {
    let game = GameRepository::new(pool)
        .set_final_score(game_id, score)
        .await?;
    tracing::info!(%game_id, home = score.home, away = score.away, "Final score recorded");

    let outcome = settlement::resettle_game(pool, game_id).await?;

    Ok((game, outcome))
}

/// Status correction. Settlement data is kept even when the game leaves
/// `finished`; a game that becomes settleable again is re-settled.
pub async fn update_status(
    pool: &PgPool,
    game_id: Uuid,
    status: GameStatus,
) -> Result<(Game, GameResettlement)> {
    let game = GameRepository::new(pool)
        .update_status(game_id, status)
        .await?;

    if game.is_settleable() {
        let outcome = settlement::resettle_game(pool, game_id).await?;
        return Ok((game, outcome));
    }

    if status != GameStatus::Finished {
        tracing::warn!(%game_id, %status, "Game left finished; stored rankings are stale");
    }

    Ok((game, GameResettlement::default()))
}

pub async fn settle(
    pool: &PgPool,
    game_id: Uuid,
    group_id: Uuid,
) -> std::result::Result<SettlementResult, SettlementError> {
    settlement::recompute_and_store(pool, game_id, group_id).await
}
