//! Blocking HTTP fetch adapter.

use crate::domain::error::TvlError;
use crate::ports::fetch_port::{FetchPort, FetchResponse};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, TvlError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tvltracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TvlError::Transport {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl FetchPort for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchResponse, TvlError> {
        // errors must not echo the URL, it can carry the api key
        let response = self.client.get(url).send().map_err(|e| TvlError::Transport {
            reason: e.without_url().to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| TvlError::Transport {
            reason: format!("failed to read body: {}", e.without_url()),
        })?;
        debug!(status, bytes = body.len(), "fetched response");
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
        })
    }
}
