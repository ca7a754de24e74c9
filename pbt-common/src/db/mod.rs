//! Database models and queries

pub mod init;
pub mod models;
pub mod players;
pub mod sessions;

pub use init::*;
pub use models::*;
