use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{get_group_leaderboard, get_member_stats};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/:group_id/leaderboard", get(get_group_leaderboard))
        .route("/:group_id/members/:user_id/stats", get(get_member_stats))
}
