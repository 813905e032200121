pub mod corrections;
pub mod notifications;
pub mod ranking;
pub mod scoring;
pub mod settlement;
pub mod wager;
