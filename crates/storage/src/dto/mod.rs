pub mod game;
pub mod prediction;
pub mod results;
pub mod settlement;
pub mod standings;
pub mod stats;
