use axum::{
    Extension, Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::{
        game::{FinalScoreResponse, SetFinalScoreRequest, UpdateGameStatusRequest},
        results::GameResultsResponse,
        settlement::SettlementResponse,
    },
    models::GameStatus,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{WebError, WebResult};
use crate::notify::Notifications;

use super::services;

#[utoipa::path(
    get,
    path = "/api/games/{game_id}/groups/{group_id}/results",
    params(
        ("game_id" = Uuid, Path, description = "Game ID"),
        ("group_id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Leaderboard for a finished game", body = GameResultsResponse),
        (status = 404, description = "Game or group not found"),
        (status = 409, description = "Game is not finished")
    ),
    tag = "games"
)]
pub async fn get_game_results(
    State(db): State<Database>,
    Path((game_id, group_id)): Path<(Uuid, Uuid)>,
) -> WebResult<Json<GameResultsResponse>> {
    let (game, group, entries) = services::get_game_results(db.pool(), game_id, group_id).await?;

    // Rankings of a game that left `finished` are stale; do not show them.
    if game.status != GameStatus::Finished {
        return Err(WebError::Conflict(format!(
            "Game {} is {}; results are not final",
            game.game_id, game.status
        )));
    }

    Ok(Json(GameResultsResponse {
        game,
        group_id: group.group_id,
        group_name: group.name,
        prize: group.prize,
        entries,
    }))
}

#[utoipa::path(
    put,
    path = "/api/games/{game_id}/final-score",
    params(
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    request_body = SetFinalScoreRequest,
    responses(
        (status = 200, description = "Final score stored and groups settled; failed groups listed", body = FinalScoreResponse),
        (status = 400, description = "Invalid score"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Game not found")
    ),
    security(("bearer_auth" = [])),
    tag = "games"
)]
pub async fn set_final_score(
    State(db): State<Database>,
    Extension(notifications): Extension<Notifications>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<SetFinalScoreRequest>,
) -> WebResult<Json<FinalScoreResponse>> {
    payload.validate()?;

    let (game, outcome) = services::set_final_score(db.pool(), game_id, payload.score()).await?;

    let response = FinalScoreResponse {
        game: game.clone(),
        settlements: outcome.settled.iter().map(SettlementResponse::from).collect(),
        failed_group_ids: outcome.failed_group_ids(),
    };
    notifications.spawn(db.pool().clone(), game, outcome.settled);

    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/games/{game_id}/status",
    params(
        ("game_id" = Uuid, Path, description = "Game ID")
    ),
    request_body = UpdateGameStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = FinalScoreResponse),
        (status = 400, description = "Finished requires a final score"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Game not found")
    ),
    security(("bearer_auth" = [])),
    tag = "games"
)]
pub async fn update_game_status(
    State(db): State<Database>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<UpdateGameStatusRequest>,
) -> WebResult<Json<FinalScoreResponse>> {
    let (game, outcome) = services::update_status(db.pool(), game_id, payload.status).await?;

    Ok(Json(FinalScoreResponse {
        game,
        settlements: outcome.settled.iter().map(SettlementResponse::from).collect(),
        failed_group_ids: outcome.failed_group_ids(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/games/{game_id}/groups/{group_id}/settle",
    params(
        ("game_id" = Uuid, Path, description = "Game ID"),
        ("group_id" = Uuid, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Predictions ranked and wager resolved", body = SettlementResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game is not finished; settlement deferred")
    ),
    security(("bearer_auth" = [])),
    tag = "games"
)]
pub async fn settle_game(
    State(db): State<Database>,
    Extension(notifications): Extension<Notifications>,
    Path((game_id, group_id)): Path<(Uuid, Uuid)>,
) -> WebResult<Json<SettlementResponse>> {
    let result = services::settle(db.pool(), game_id, group_id).await?;
    let response = SettlementResponse::from(&result);

    let game = services::get_game(db.pool(), game_id).await?;
    notifications.spawn(db.pool().clone(), game, vec![result]);

    Ok(Json(response))
}
