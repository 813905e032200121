use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Membership;
use crate::services::notifications::Recipient;

pub struct MembershipRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MembershipRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, group_id: Uuid, user_id: Uuid) -> Result<Membership> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT membership_id, user_id, group_id, wager_opt_in, role, joined_at
            FROM memberships
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(membership)
    }

    /// Members who predicted the game, with the channels they accept results on
    pub async fn list_result_recipients(&self, game_id: Uuid, group_id: Uuid) -> Result<Vec<Recipient>> {
        let recipients = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT u.user_id,
                   COALESCE(u.nickname, u.name) AS name,
                   m.wager_opt_in,
                   CASE WHEN u.email_notifications THEN u.email END AS email,
                   CASE WHEN u.sms_notifications THEN u.phone_number END AS phone_number
            FROM predictions p
            INNER JOIN users u ON u.user_id = p.user_id
            INNER JOIN memberships m ON m.user_id = p.user_id AND m.group_id = p.group_id
            WHERE p.game_id = $1 AND p.group_id = $2
            ORDER BY p.created_at, p.prediction_id
            "#,
        )
        .bind(game_id)
        .bind(group_id)
        .fetch_all(self.pool)
        .await?;

        Ok(recipients)
    }
}
