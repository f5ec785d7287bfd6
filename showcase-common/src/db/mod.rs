//! Database models and queries

pub mod init;
pub mod models;
pub mod videos;

pub use init::*;
pub use models::*;
