use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use storage::{
    Database,
    dto::{standings::GroupLeaderboardResponse, stats::MemberStats},
};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::WebResult;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardParams {
    /// Season to tally; the group's season when omitted
    pub season: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/members/{user_id}/stats",
    params(
        ("group_id" = Uuid, Path, description = "Group ID"),
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Member statistics over finished games", body = MemberStats),
        (status = 404, description = "User is not a member of the group")
    ),
    tag = "groups"
)]
pub async fn get_member_stats(
    State(db): State<Database>,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> WebResult<Json<MemberStats>> {
    let stats = services::get_member_stats(db.pool(), group_id, user_id).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/leaderboard",
    params(
        ("group_id" = Uuid, Path, description = "Group ID"),
        LeaderboardParams
    ),
    responses(
        (status = 200, description = "Season standings by wager wins, then average delta", body = GroupLeaderboardResponse),
        (status = 404, description = "Group not found")
    ),
    tag = "groups"
)]
pub async fn get_group_leaderboard(
    State(db): State<Database>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<LeaderboardParams>,
) -> WebResult<Json<GroupLeaderboardResponse>> {
    let leaderboard = services::get_group_leaderboard(db.pool(), group_id, params.season).await?;
    Ok(Json(leaderboard))
}
