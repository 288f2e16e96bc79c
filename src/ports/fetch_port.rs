//! Remote fetch port trait.

use crate::domain::error::TvlError;

/// Raw HTTP outcome: status code and body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub trait FetchPort {
    /// Performs one GET. Non-2xx statuses are returned, not raised; only
    /// transport failures are errors.
    fn fetch(&self, url: &str) -> Result<FetchResponse, TvlError>;
}
