pub mod games;
pub mod groups;
pub mod predictions;
pub mod settlements;
