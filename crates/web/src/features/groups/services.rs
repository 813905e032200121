use sqlx::PgPool;
use storage::{
    dto::{
        standings::{self, GroupLeaderboardResponse},
        stats::MemberStats,
    },
    error::Result,
    repository::{
        group::GroupRepository, membership::MembershipRepository, prediction::PredictionRepository,
    },
};
use uuid::Uuid;

pub async fn get_member_stats(pool: &PgPool, group_id: Uuid, user_id: Uuid) -> Result<MemberStats> {
    // NotFound for users outside the group
    MembershipRepository::new(pool)
        .find(group_id, user_id)
        .await?;

    PredictionRepository::new(pool)
        .member_stats(group_id, user_id)
        .await
}

/// Season standings of a group; defaults to the group's own season
pub async fn get_group_leaderboard(
    pool: &PgPool,
    group_id: Uuid,
    season: Option<i32>,
) -> Result<GroupLeaderboardResponse> {
    let group = GroupRepository::new(pool).find_by_id(group_id).await?;
    let season = season.unwrap_or(group.season);

    let rows = PredictionRepository::new(pool)
        .group_leaderboard(group_id, season)
        .await?;

    Ok(GroupLeaderboardResponse {
        group_id: group.group_id,
        group_name: group.name,
        season,
        prize: group.prize,
        standings: standings::number_standings(rows),
    })
}
