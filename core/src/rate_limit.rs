//! Server-reported request quota.
//!
//! The NPS API reports the hourly quota on every response through the
//! `X-RateLimit-Limit` and `X-RateLimit-Remaining` headers. The client keeps
//! the most recent values in a [`RateLimitCell`] shared by every call made
//! through it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::http::HttpResponse;

pub const HEADER_RATE_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

/// The most recently observed quota counters.
///
/// Values are kept as the raw header text; a missing header is an empty
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: String,
    pub remaining: String,
    /// `None` until the first response has been observed.
    pub last_updated: Option<DateTime<Utc>>,
}

impl RateLimit {
    pub fn from_response(response: &HttpResponse, now: DateTime<Utc>) -> Self {
        Self {
            limit: response.header(HEADER_RATE_LIMIT).unwrap_or_default().to_string(),
            remaining: response
                .header(HEADER_RATE_LIMIT_REMAINING)
                .unwrap_or_default()
                .to_string(),
            last_updated: Some(now),
        }
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit.trim().parse().ok()
    }

    pub fn remaining_value(&self) -> Option<u64> {
        self.remaining.trim().parse().ok()
    }
}

/// Shared, lock-protected [`RateLimit`] snapshot.
///
/// Writers replace the whole snapshot under the lock, so readers never see
/// fields from two different responses.
#[derive(Debug, Clone, Default)]
pub struct RateLimitCell {
    inner: Arc<Mutex<RateLimit>>,
}

impl RateLimitCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, snapshot: RateLimit) {
        *self.inner.lock() = snapshot;
    }

    /// Records the headers of `response` as the current snapshot.
    pub fn observe(&self, response: &HttpResponse) {
        let snapshot = RateLimit::from_response(response, Utc::now());
        tracing::debug!(
            limit = %snapshot.limit,
            remaining = %snapshot.remaining,
            "rate limit updated"
        );
        self.update(snapshot);
    }

    pub fn snapshot(&self) -> RateLimit {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reads_both_headers() {
        let resp = HttpResponse::new(200, "")
            .with_header("x-ratelimit-limit", "1000")
            .with_header("x-ratelimit-remaining", "998");
        let cell = RateLimitCell::new();
        cell.observe(&resp);

        let snap = cell.snapshot();
        assert_eq!(snap.limit, "1000");
        assert_eq!(snap.remaining, "998");
        assert_eq!(snap.limit_value(), Some(1000));
        assert_eq!(snap.remaining_value(), Some(998));
        assert!(snap.last_updated.is_some());
    }

    #[test]
    fn missing_headers_become_empty_strings() {
        let cell = RateLimitCell::new();
        cell.update(RateLimit {
            limit: "1000".into(),
            remaining: "1".into(),
            last_updated: None,
        });
        cell.observe(&HttpResponse::new(204, ""));

        let snap = cell.snapshot();
        assert_eq!(snap.limit, "");
        assert_eq!(snap.remaining, "");
        assert_eq!(snap.limit_value(), None);
    }

    #[test]
    fn new_cell_has_never_been_updated() {
        assert_eq!(RateLimitCell::new().snapshot(), RateLimit::default());
    }

    #[test]
    fn clones_share_the_same_snapshot() {
        let cell = RateLimitCell::new();
        let other = cell.clone();
        other.observe(&HttpResponse::new(200, "").with_header(HEADER_RATE_LIMIT, "5"));
        assert_eq!(cell.snapshot().limit, "5");
    }
}
