//! The `/parks` endpoint.

use serde::{Serialize, Serializer};

use crate::client::Client;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::option::with_options;
use crate::types::{Park, Parks};

/// Query parameters accepted by `/parks`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParksOptions {
    /// Park codes, sent comma-separated (e.g. `yell,grca`).
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub park_code: Vec<String>,
    /// Two-letter state codes, sent comma-separated.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub state_code: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    /// Free-text search term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Fields to sort by; a leading `-` sorts descending.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub sort: Vec<String>,
}

impl ParksOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn park_code(mut self, code: impl Into<String>) -> Self {
        self.park_code.push(code.into());
        self
    }

    pub fn state_code(mut self, code: impl Into<String>) -> Self {
        self.state_code.push(code.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort.push(field.into());
        self
    }
}

fn comma_separated<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

/// Calls against the `/parks` endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ParksService<'a> {
    client: &'a Client,
}

impl<'a> ParksService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists parks matching `options`.
    pub fn list(&self, options: &ParksOptions) -> Result<Parks, ApiError> {
        let req = self
            .client
            .new_request(HttpMethod::Get, "parks", [with_options(Some(options))])?;
        self.client.send_and_decode(req)
    }

    /// Looks up a single park by its code, e.g. `yell`.
    pub fn get(&self, park_code: &str) -> Result<Option<Park>, ApiError> {
        let options = ParksOptions::new().park_code(park_code).limit(1);
        let parks = self.list(&options)?;
        Ok(parks.data.into_iter().next())
    }
}
