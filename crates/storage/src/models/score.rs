use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A complete home/away score, either predicted or final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct Score {
    pub home: i32,
    pub away: i32,
}

impl Score {
    pub fn new(home: i32, away: i32) -> Self {
        Self { home, away }
    }
}

/// A final score as stored on a game, where either side may still be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct PartialScore {
    pub home: Option<i32>,
    pub away: Option<i32>,
}

impl PartialScore {
    pub fn new(home: Option<i32>, away: Option<i32>) -> Self {
        Self { home, away }
    }

    /// Returns the score only when both sides are known
    pub fn complete(self) -> Option<Score> {
        match (self.home, self.away) {
            (Some(home), Some(away)) => Some(Score { home, away }),
            _ => None,
        }
    }
}

impl From<Score> for PartialScore {
    fn from(score: Score) -> Self {
        Self {
            home: Some(score.home),
            away: Some(score.away),
        }
    }
}
