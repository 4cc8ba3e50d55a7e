//! The seam between the client and the network.
//!
//! Any HTTP implementation can be plugged in through [`Transport`]. The
//! default [`UreqTransport`] runs calls on the current thread with ureq and
//! returns 4xx/5xx responses as data so the client can classify them.

use std::fmt;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};

/// Errors raised before a response was received.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request's deadline passed before it could be sent.
    #[error("deadline exceeded before the request was sent")]
    DeadlineExceeded,

    #[error("http transport error: {0}")]
    Ureq(#[from] ureq::Error),

    /// Failure reported by a custom transport.
    #[error("http transport error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TransportError::Other(err.into())
    }
}

/// Sends an [`HttpRequest`] and returns the raw [`HttpResponse`].
///
/// Implementations must not treat failure statuses as errors; status
/// interpretation belongs to the client.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Uses a caller-configured agent. The agent must have
    /// `http_status_as_error` disabled or failure statuses surface as
    /// transport errors instead of API errors.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = remaining(request.deadline)?;
        let url = request.url.as_str();
        let headers = &request.headers;

        let response = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => prepare(self.agent.get(url), headers, timeout).call(),
            (HttpMethod::Delete, _) => prepare(self.agent.delete(url), headers, timeout).call(),
            (HttpMethod::Post, Some(body)) => prepare(self.agent.post(url), headers, timeout).send(body),
            (HttpMethod::Post, None) => prepare(self.agent.post(url), headers, timeout).send_empty(),
            (HttpMethod::Put, Some(body)) => prepare(self.agent.put(url), headers, timeout).send(body),
            (HttpMethod::Put, None) => prepare(self.agent.put(url), headers, timeout).send_empty(),
            (HttpMethod::Patch, Some(body)) => prepare(self.agent.patch(url), headers, timeout).send(body),
            (HttpMethod::Patch, None) => prepare(self.agent.patch(url), headers, timeout).send_empty(),
        }?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: ResponseBody::from_reader(response.into_body().into_reader()),
        })
    }
}

/// Time left before `deadline`, or an error when it already passed.
fn remaining(deadline: Option<Instant>) -> Result<Option<Duration>, TransportError> {
    let Some(deadline) = deadline else {
        return Ok(None);
    };
    match deadline.checked_duration_since(Instant::now()) {
        Some(left) if !left.is_zero() => Ok(Some(left)),
        _ => Err(TransportError::DeadlineExceeded),
    }
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    timeout: Option<Duration>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_deadline_means_no_timeout() {
        assert_eq!(remaining(None).unwrap(), None);
    }

    #[test]
    fn future_deadline_yields_remaining_time() {
        let left = remaining(Some(Instant::now() + Duration::from_secs(30))).unwrap().unwrap();
        assert!(left <= Duration::from_secs(30));
        assert!(left > Duration::from_secs(25));
    }

    #[test]
    fn past_deadline_is_rejected_without_sending() {
        let past = Instant::now() - Duration::from_millis(1);
        let err = remaining(Some(past)).unwrap_err();
        assert!(matches!(err, TransportError::DeadlineExceeded));

        let request = HttpRequest {
            deadline: Some(past),
            ..HttpRequest::new(HttpMethod::Get, url::Url::parse("http://127.0.0.1:9/").unwrap())
        };
        let err = UreqTransport::new().send(request).unwrap_err();
        assert!(matches!(err, TransportError::DeadlineExceeded));
    }
}
