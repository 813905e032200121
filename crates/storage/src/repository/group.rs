use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Group;

pub struct GroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, group_id: Uuid) -> Result<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT group_id, name, slug, season, prize, owner_id, created_at
            FROM groups
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(group)
    }
}
