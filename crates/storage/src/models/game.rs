use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::score::PartialScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
    Canceled,
}

#[derive(Debug, Error)]
#[error("Unknown game status: '{0}'")]
pub struct UnknownGameStatus(pub String);

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Finished => "finished",
            Self::Canceled => "canceled",
        }
    }

    pub fn all() -> &'static [GameStatus] {
        &[Self::Scheduled, Self::Live, Self::Finished, Self::Canceled]
    }

    fn parse_str(s: &str) -> Result<Self, UnknownGameStatus> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "live" => Ok(Self::Live),
            "finished" => Ok(Self::Finished),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(UnknownGameStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for GameStatus {
    type Error = UnknownGameStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_str(&value)
    }
}

impl std::str::FromStr for GameStatus {
    type Err = UnknownGameStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A game tracked by one or more groups.
///
/// Scores stay `None` until an operator enters the final result. Legacy data
/// recorded canceled games as 0-0, so `status` is what tells a canceled game
/// apart from a genuine scoreless final.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Game {
    pub game_id: Uuid,
    pub home_team: String,
    pub away_team: String,
    pub game_time: NaiveDateTime,
    pub season: i32,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: GameStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Game {
    pub fn final_score(&self) -> PartialScore {
        PartialScore::new(self.home_score, self.away_score)
    }

    /// Only finished games with both scores present can be settled
    pub fn is_settleable(&self) -> bool {
        self.status == GameStatus::Finished && self.final_score().complete().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(status: GameStatus, home: Option<i32>, away: Option<i32>) -> Game {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        Game {
            game_id: Uuid::new_v4(),
            home_team: "OSU".to_string(),
            away_team: "Michigan".to_string(),
            game_time: now,
            season: 2024,
            home_score: home,
            away_score: away,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_parsing() {
        use std::str::FromStr;

        assert_eq!(GameStatus::from_str("finished").unwrap(), GameStatus::Finished);
        assert_eq!(GameStatus::from_str("LIVE").unwrap(), GameStatus::Live);
        assert_eq!(GameStatus::from_str("cancelled").unwrap(), GameStatus::Canceled);
        assert_eq!(
            GameStatus::try_from("scheduled".to_string()).unwrap(),
            GameStatus::Scheduled
        );
        assert!(GameStatus::from_str("postponed").is_err());
    }

    #[test]
    fn test_status_round_trips_through_as_str() {
        for status in GameStatus::all() {
            assert_eq!(status.as_str().parse::<GameStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_settleable_requires_finished_and_both_scores() {
        assert!(game(GameStatus::Finished, Some(24), Some(17)).is_settleable());
        assert!(game(GameStatus::Finished, Some(0), Some(0)).is_settleable());
        assert!(!game(GameStatus::Finished, Some(24), None).is_settleable());
        assert!(!game(GameStatus::Live, Some(24), Some(17)).is_settleable());
        assert!(!game(GameStatus::Canceled, Some(0), Some(0)).is_settleable());
    }
}
