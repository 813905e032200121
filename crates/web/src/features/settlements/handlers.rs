use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use storage::{Database, dto::settlement::ResettleSummaryResponse};
use utoipa::IntoParams;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResettleParams {
    /// Limit the run to one season
    pub season: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/settlements/resettle",
    params(ResettleParams),
    responses(
        (status = 200, description = "Finished games re-settled", body = ResettleSummaryResponse),
        (status = 401, description = "Missing or invalid API key")
    ),
    security(("bearer_auth" = [])),
    tag = "settlements"
)]
pub async fn resettle_all(
    State(db): State<Database>,
    Query(params): Query<ResettleParams>,
) -> WebResult<Json<ResettleSummaryResponse>> {
    let summary = services::resettle_all(db.pool(), params.season).await?;

    Ok(Json(summary.into()))
}
