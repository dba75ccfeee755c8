pub mod clean;
pub mod dist;
