pub mod game;
pub mod group;
pub mod membership;
pub mod prediction;
pub mod score;

pub use game::{Game, GameStatus};
pub use group::Group;
pub use membership::{MemberRole, Membership, WagerFlag};
pub use prediction::Prediction;
pub use score::{PartialScore, Score};
