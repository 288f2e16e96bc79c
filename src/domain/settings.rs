//! Resolved run settings.

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.dune.com/api/v1/query/5535180/results";
pub const DEFAULT_DATA_PATH: &str = "tvl_data.csv";
pub const DEFAULT_CONFIG_PATH: &str = "tvltracker.ini";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub data_path: PathBuf,
}

impl Settings {
    /// The endpoint with `api_key` appended as a query parameter when set.
    pub fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("api_key", key);
        }
        url
    }
}
