//! Composable mutators applied to a pending request.
//!
//! Options run in the order they are passed to `Client::new_request`; a
//! later option overwrites whatever an earlier one set. The first option
//! that fails aborts the build.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::ApiError;
use crate::http::HttpRequest;

type ApplyFn = Box<dyn FnOnce(&mut HttpRequest) -> Result<(), ApiError> + Send>;

/// A single request mutator.
pub struct RequestOption(ApplyFn);

impl RequestOption {
    pub fn new(f: impl FnOnce(&mut HttpRequest) -> Result<(), ApiError> + Send + 'static) -> Self {
        RequestOption(Box::new(f))
    }

    pub fn apply(self, request: &mut HttpRequest) -> Result<(), ApiError> {
        (self.0)(request)
    }
}

impl fmt::Debug for RequestOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RequestOption")
    }
}

/// Sends `value` as the JSON request body, replacing any previous body.
///
/// Encoding happens immediately; an encoding failure is reported when the
/// option is applied.
pub fn with_json_body<T: Serialize + ?Sized>(value: &T) -> RequestOption {
    let encoded = serde_json::to_vec(value).map_err(ApiError::Serialization);
    RequestOption::new(move |req| {
        req.body = Some(encoded?);
        req.set_header("Content-Type", "application/json");
        Ok(())
    })
}

/// Replaces the query string with the given key/value pairs.
///
/// Keys are emitted in sorted order. An empty map clears the query.
pub fn with_query<I, K, V>(pairs: I) -> RequestOption
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let params: BTreeMap<String, String> = pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    RequestOption::new(move |req| {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&params)
            .finish();
        set_raw_query(req, &encoded);
        Ok(())
    })
}

/// Replaces the query string with the fields of `opts`.
///
/// Parameter names come from the type's serde attributes. `None` leaves the
/// request untouched.
pub fn with_options<T: Serialize + ?Sized>(opts: Option<&T>) -> RequestOption {
    let encoded = opts.map(serde_urlencoded::to_string).transpose();
    RequestOption::new(move |req| {
        if let Some(encoded) = encoded? {
            set_raw_query(req, &encoded);
        }
        Ok(())
    })
}

/// Gives up on the call once `timeout` has elapsed, counted from when the
/// option is applied to the request.
pub fn with_timeout(timeout: Duration) -> RequestOption {
    RequestOption::new(move |req| {
        req.deadline = Some(Instant::now() + timeout);
        Ok(())
    })
}

pub fn with_deadline(deadline: Instant) -> RequestOption {
    RequestOption::new(move |req| {
        req.deadline = Some(deadline);
        Ok(())
    })
}

/// Sets a header, replacing any existing value.
pub fn with_header(name: impl Into<String>, value: impl Into<String>) -> RequestOption {
    let (name, value) = (name.into(), value.into());
    RequestOption::new(move |req| {
        req.set_header(&name, value);
        Ok(())
    })
}

fn set_raw_query(req: &mut HttpRequest, encoded: &str) {
    if encoded.is_empty() {
        req.url.set_query(None);
    } else {
        req.url.set_query(Some(encoded));
    }
}
