use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Group {
    pub group_id: Uuid,
    pub name: String,
    pub slug: String,
    pub season: i32,
    pub prize: Option<String>,
    pub owner_id: Uuid,
    pub created_at: NaiveDateTime,
}
