//! Core domain types and logic.

pub mod record;
pub mod dataset;
pub mod response;
pub mod upsert;
pub mod summary;
pub mod settings;
pub mod config_validation;
pub mod error;
