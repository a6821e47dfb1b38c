pub mod analysis;
pub mod intake;
pub mod rule;
