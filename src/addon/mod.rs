pub mod manage;
pub mod manifest;
pub mod summary;
