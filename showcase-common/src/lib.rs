//! # Showcase Common Library
//!
//! Shared code for the showcase view-counting service and its clients:
//! - Database initialization and the `Video` model
//! - View count event types
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use events::ViewCountUpdate;
