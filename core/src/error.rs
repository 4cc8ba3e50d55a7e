//! Error types for the NPS API client.
//!
//! # Design
//! The four status codes the NPS API documents (400, 401, 404, 429) get
//! dedicated variants with endpoint-agnostic messages. Any other failure
//! status is decoded from the API's `{"error": {"code", "message"}}`
//! envelope, falling back to the raw body text, and finally to the read
//! failure when the body cannot be read at all. Every variant that came
//! from a response carries the status line.

use std::io;

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::transport::TransportError;

/// Errors returned by the client while building, sending or decoding a call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client was constructed without an API key.
    #[error("api key token was empty")]
    MissingToken,

    /// The configuration could not be used to build a client.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// The request path could not be joined onto the base URL.
    #[error("unable to join path {path:?} onto {base}")]
    InvalidUrl { base: String, path: String },

    /// The JSON body option could not encode its value.
    #[error("unable to marshal request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The structured query option could not encode its value.
    #[error("unable to encode query parameters: {0}")]
    QueryEncoding(#[from] serde_urlencoded::ser::Error),

    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// 429: the key exceeded its hourly quota.
    #[error("your API key is being temporarily blocked from making further requests. The block will automatically be lifted by waiting an hour: {status}")]
    RateLimited { status: String },

    /// 401.
    #[error("not authorized for api endpoint: {status}")]
    Unauthorized { status: String },

    /// 400.
    #[error("request to api was not understood: {status}")]
    BadRequest { status: String },

    /// 404.
    #[error("api endpoint was not found: {status}")]
    NotFound { status: String },

    /// Any other failure status whose body held the NPS error envelope.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A failure status whose body was not an error envelope.
    #[error("{status}: {body}")]
    RemoteRaw { status: String, body: String },

    /// A failure status whose body could not be read.
    #[error("{status}: unable to decode error response: {source}")]
    RemoteUnreadable {
        status: String,
        #[source]
        source: io::Error,
    },

    /// A success body that did not decode into the requested type.
    #[error("unable to decode json response: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status code of the response this error was classified from.
    pub fn status(&self) -> Option<u16> {
        let line = match self {
            ApiError::RateLimited { status }
            | ApiError::Unauthorized { status }
            | ApiError::BadRequest { status }
            | ApiError::NotFound { status }
            | ApiError::RemoteRaw { status, .. }
            | ApiError::RemoteUnreadable { status, .. } => status,
            ApiError::Remote(err) => return Some(err.status),
            _ => return None,
        };
        line.split_whitespace().next()?.parse().ok()
    }
}

/// The NPS API's own error report: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Code: {code} Message: {message}")]
pub struct RemoteError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Turns the body of a failed response into an error.
///
/// The body is drained here; the caller never sees it.
pub(crate) fn decode_error_response(response: &mut HttpResponse) -> ApiError {
    let status = response.status_line();

    let bytes = match response.body.read_to_vec() {
        Ok(bytes) => bytes,
        Err(source) => return ApiError::RemoteUnreadable { status, source },
    };

    match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
        Ok(envelope) => ApiError::Remote(RemoteError {
            status: response.status,
            code: envelope.error.code,
            message: envelope.error.message,
        }),
        Err(_) => ApiError::RemoteRaw {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::http::ResponseBody;

    struct BrokenPipe;

    impl Read for BrokenPipe {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"))
        }
    }

    #[test]
    fn envelope_renders_code_and_message() {
        let mut resp = HttpResponse::new(500, r#"{"error":{"code":"X","message":"Y"}}"#)
            .with_reason("Internal Server Error");
        let err = decode_error_response(&mut resp);
        assert!(matches!(err, ApiError::Remote(_)));
        assert_eq!(err.to_string(), "Code: X Message: Y");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn non_json_body_falls_back_to_raw_text() {
        let mut resp = HttpResponse::new(500, "oops").with_reason("Internal Server Error");
        let err = decode_error_response(&mut resp);
        assert!(matches!(err, ApiError::RemoteRaw { .. }));
        assert_eq!(err.to_string(), "500 Internal Server Error: oops");
    }

    #[test]
    fn json_without_envelope_is_raw() {
        let mut resp = HttpResponse::new(503, r#"{"status":"down"}"#);
        let err = decode_error_response(&mut resp);
        assert_eq!(err.to_string(), r#"503: {"status":"down"}"#);
    }

    #[test]
    fn unreadable_body_is_reported_separately() {
        let mut resp = HttpResponse::new(502, ResponseBody::from_reader(BrokenPipe)).with_reason("Bad Gateway");
        let err = decode_error_response(&mut resp);
        match &err {
            ApiError::RemoteUnreadable { status, source } => {
                assert_eq!(status, "502 Bad Gateway");
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("unable to decode error response"));
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn envelope_with_missing_fields_defaults_to_empty() {
        let mut resp = HttpResponse::new(403, r#"{"error":{"code":"API_KEY_MISSING"}}"#);
        let err = decode_error_response(&mut resp);
        assert_eq!(err.to_string(), "Code: API_KEY_MISSING Message: ");
    }

    #[test]
    fn status_is_absent_for_local_errors() {
        assert_eq!(ApiError::MissingToken.status(), None);
    }
}
