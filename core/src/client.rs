//! Generic NPS API client: request construction, dispatch and response
//! validation.
//!
//! # Design
//! `Client` holds the base URL, the API key, a [`Transport`] and the shared
//! rate-limit snapshot. Every call goes through three steps that can also be
//! driven separately:
//!
//! 1. `new_request` joins the path onto the base URL, sets the fixed headers
//!    and applies options in order.
//! 2. `validate_response` records the rate-limit headers and classifies the
//!    status code. Failure bodies are decoded into an error and never handed
//!    back to the caller.
//! 3. `send` / `send_and_decode` tie the two together around the transport.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, SecretString};
use crate::error::{decode_error_response, ApiError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::option::RequestOption;
use crate::rate_limit::{RateLimit, RateLimitCell};
use crate::transport::{Transport, UreqTransport};

pub const HEADER_API_KEY: &str = "X-Api-Key";
pub const ACCEPT_JSON: &str = "application/json; charset=utf-8";

/// Client for the NPS REST API.
///
/// Cloning is cheap; clones share the transport and the rate-limit snapshot.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: Url,
    token: SecretString,
    config: ClientConfig,
    rate_limit: RateLimitCell,
}

impl Client {
    /// Client for the public NPS API using the default transport.
    pub fn new(token: impl Into<SecretString>) -> Result<Self, ApiError> {
        Self::from_config(ClientConfig::new(token))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self, ApiError> {
        let base_url = config.validate()?;
        Ok(Self {
            transport: Arc::new(transport),
            base_url,
            token: config.api_key.clone(),
            config,
            rate_limit: RateLimitCell::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The quota counters reported by the most recent response.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.snapshot()
    }

    /// Builds a request for `path` relative to the base URL.
    ///
    /// Path segments are percent-escaped. `.` and `..` are resolved within
    /// `path` and never climb above the base URL. A trailing `/` is kept.
    /// The configured timeout becomes the request deadline unless an option
    /// overrides it.
    pub fn new_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<HttpRequest, ApiError> {
        let url = self.join_path(path)?;

        let mut req = HttpRequest::new(method, url);
        req.set_header("Accept", ACCEPT_JSON);
        req.set_header(HEADER_API_KEY, self.token.expose());
        req.deadline = self.config.timeout.map(|t| Instant::now() + t);

        for option in options {
            option.apply(&mut req)?;
        }

        Ok(req)
    }

    fn join_path(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| ApiError::InvalidUrl {
                base: self.base_url.to_string(),
                path: path.to_string(),
            })?;
            // `..` is clamped at the base URL; it never removes base segments.
            let mut cleaned = Vec::new();
            for segment in path.split('/') {
                match segment {
                    "" | "." => {}
                    ".." => {
                        cleaned.pop();
                    }
                    s => cleaned.push(s),
                }
            }
            segments.pop_if_empty().extend(cleaned);
            if path.ends_with('/') {
                segments.push("");
            }
        }
        Ok(url)
    }

    /// Sends `request` and validates the response.
    ///
    /// On a failure status the body is consumed by the error decoder and only
    /// the error is returned.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending nps api request");
        let mut response = self.transport.send(request)?;
        self.validate_response(&mut response)?;
        Ok(response)
    }

    /// Sends `request` and decodes a successful JSON body into `T`.
    pub fn send_and_decode<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.send(request)?;
        serde_json::from_reader(response.body).map_err(ApiError::Deserialization)
    }

    /// Records the rate-limit headers, then maps the status to an error.
    ///
    /// The snapshot is updated for every response, failures included.
    pub fn validate_response(&self, response: &mut HttpResponse) -> Result<(), ApiError> {
        self.rate_limit.observe(response);

        let status = response.status;
        let err = match status {
            s if s < 400 => return Ok(()),
            429 => ApiError::RateLimited {
                status: response.status_line(),
            },
            401 => ApiError::Unauthorized {
                status: response.status_line(),
            },
            400 => ApiError::BadRequest {
                status: response.status_line(),
            },
            404 => ApiError::NotFound {
                status: response.status_line(),
            },
            _ => decode_error_response(response),
        };

        tracing::warn!(status, error = %err, "nps api returned an error");
        Err(err)
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "url: {}", self.base_url)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}
