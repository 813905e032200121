pub mod game;
pub mod group;
pub mod membership;
pub mod prediction;
pub mod settlement;
