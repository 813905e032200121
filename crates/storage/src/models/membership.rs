use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    #[default]
    Member,
    Admin,
}

#[derive(Debug, Error)]
#[error("Unknown member role: '{0}'")]
pub struct UnknownMemberRole(pub String);

impl TryFrom<String> for MemberRole {
    type Error = UnknownMemberRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownMemberRole(value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Membership {
    pub membership_id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    /// Whether the member plays for coffee this season
    pub wager_opt_in: bool,
    #[sqlx(try_from = "String")]
    pub role: MemberRole,
    pub joined_at: NaiveDateTime,
}

/// The slice of a membership that settlement needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WagerFlag {
    pub user_id: Uuid,
    pub wager_opt_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(MemberRole::try_from("admin".to_string()).unwrap(), MemberRole::Admin);
        assert_eq!(MemberRole::try_from("member".to_string()).unwrap(), MemberRole::Member);
        assert!(MemberRole::try_from("owner".to_string()).is_err());
    }
}
