use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::{
        prediction::{OverridePredictionRequest, OverridePredictionResponse},
        settlement::SettlementResponse,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebResult;

use super::services;

#[utoipa::path(
    put,
    path = "/api/predictions/{prediction_id}",
    params(
        ("prediction_id" = Uuid, Path, description = "Prediction ID")
    ),
    request_body = OverridePredictionRequest,
    responses(
        (status = 200, description = "Prediction updated", body = OverridePredictionResponse),
        (status = 400, description = "Invalid score"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Prediction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "predictions"
)]
pub async fn override_prediction(
    State(db): State<Database>,
    Path(prediction_id): Path<Uuid>,
    Json(payload): Json<OverridePredictionRequest>,
) -> WebResult<Json<OverridePredictionResponse>> {
    payload.validate()?;

    let (prediction, settlement) =
        services::override_prediction(db.pool(), prediction_id, payload.score()).await?;

    Ok(Json(OverridePredictionResponse {
        prediction,
        settlement: settlement.as_ref().map(SettlementResponse::from),
    }))
}
