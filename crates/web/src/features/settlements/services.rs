use sqlx::PgPool;
use storage::{
    error::Result,
    services::settlement::{self, ResettleSummary},
};

/// Re-settle every finished game, optionally limited to one season
pub async fn resettle_all(pool: &PgPool, season: Option<i32>) -> Result<ResettleSummary> {
    settlement::resettle_all(pool, season).await
}
