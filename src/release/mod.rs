pub mod git;
pub mod stage;
