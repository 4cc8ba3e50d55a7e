//! Resource-level entry point.
//!
//! `NpsClient` wraps the generic [`Client`] and hands out one service per
//! API resource.

use crate::client::Client;
use crate::config::{ClientConfig, SecretString};
use crate::error::ApiError;
use crate::parks::ParksService;
use crate::rate_limit::RateLimit;

#[derive(Debug, Clone)]
pub struct NpsClient {
    api: Client,
}

impl NpsClient {
    pub fn new(token: impl Into<SecretString>) -> Result<Self, ApiError> {
        Ok(Self::from_client(Client::new(token)?))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::from_client(Client::from_config(config)?))
    }

    pub fn from_client(api: Client) -> Self {
        Self { api }
    }

    pub fn parks(&self) -> ParksService<'_> {
        ParksService::new(&self.api)
    }

    /// The generic client, for endpoints without a dedicated service.
    pub fn api(&self) -> &Client {
        &self.api
    }

    pub fn rate_limit(&self) -> RateLimit {
        self.api.rate_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_fails() {
        assert!(matches!(NpsClient::new(""), Err(ApiError::MissingToken)));
    }

    #[test]
    fn wraps_generic_client() {
        let nps = NpsClient::new("key").unwrap();
        assert_eq!(nps.api().to_string(), "url: https://developer.nps.gov/api/v1/");
        assert!(nps.rate_limit().last_updated.is_none());
    }
}
