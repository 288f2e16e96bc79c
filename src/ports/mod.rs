//! Port traits.

pub mod config_port;
pub mod dataset_port;
pub mod fetch_port;
