//! HTTP request and response values exchanged with a [`Transport`].
//!
//! # Design
//! Requests are plain data: the client builds an `HttpRequest`, options
//! mutate it, and a transport executes it. Responses keep the body as a
//! stream so that it is read at most once, either by the error decoder or
//! by the JSON decoder, and released when the response is dropped.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;
use std::io::{self, Cursor, Read};
use std::time::Instant;

use url::Url;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request. Built once per call by `Client::new_request`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Point in time after which the transport must give up on the call.
    pub deadline: Option<Instant>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            deadline: None,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Replaces every existing value of `name` with `value`.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }
}

/// The body of a response, consumed at most once.
///
/// The reader is `Send`, so a response can be handed to another thread
/// before its body is read.
pub struct ResponseBody {
    reader: Box<dyn Read + Send>,
}

impl ResponseBody {
    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn empty() -> Self {
        Self::from_reader(io::empty())
    }

    /// Reads the remaining body into memory.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_reader(Cursor::new(bytes))
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}

impl From<&'static str> for ResponseBody {
    fn from(text: &'static str) -> Self {
        Self::from_reader(text.as_bytes())
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody { .. }")
    }
}

/// A response returned by a transport.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`. May be empty.
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<ResponseBody>) -> Self {
        Self {
            status,
            reason: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup; the first value wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Status code followed by the reason phrase, e.g. `404 Not Found`.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_includes_reason_when_present() {
        let resp = HttpResponse::new(404, "").with_reason("Not Found");
        assert_eq!(resp.status_line(), "404 Not Found");
        assert_eq!(HttpResponse::new(500, "").status_line(), "500");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = HttpResponse::new(200, "").with_header("X-RateLimit-Limit", "1000");
        assert_eq!(resp.header("x-ratelimit-limit"), Some("1000"));
        assert_eq!(resp.header("X-RateLimit-Remaining"), None);
    }

    #[test]
    fn set_header_replaces_existing_value() {
        let mut req = HttpRequest::new(HttpMethod::Get, Url::parse("http://localhost/").unwrap());
        req.set_header("Accept", "text/plain");
        req.set_header("accept", "application/json");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("ACCEPT"), Some("application/json"));
    }

    #[test]
    fn body_is_drained_after_first_read() {
        let mut body = ResponseBody::from("hello");
        assert_eq!(body.read_to_vec().unwrap(), b"hello");
        assert!(body.read_to_vec().unwrap().is_empty());
    }

    #[test]
    fn response_body_is_read_on_another_thread() {
        let mut resp = HttpResponse::new(200, b"{\"total\":\"1\"}".to_vec()).with_reason("OK");
        let body = std::thread::spawn(move || resp.body.read_to_vec().unwrap())
            .join()
            .unwrap();
        assert_eq!(body, br#"{"total":"1"}"#);
    }
}
