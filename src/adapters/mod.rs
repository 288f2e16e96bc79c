//! Concrete adapter implementations for ports.

#[cfg(feature = "http")]
pub mod http_fetcher;
pub mod csv_store;
pub mod file_config_adapter;
