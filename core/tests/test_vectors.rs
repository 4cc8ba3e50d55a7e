//! Verify request building and response classification against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each vector describes a simulated response (or request inputs) and the
//! expected outcome. Error expectations compare the variant and the full
//! rendered message, since callers rely on that text.

use std::sync::Arc;

use nps_core::{
    ApiError, Client, ClientConfig, HttpMethod, HttpRequest, HttpResponse, NpsClient, ParksOptions, Transport,
    TransportError,
};
use parking_lot::Mutex;

fn client() -> Client {
    Client::new("vector-key").unwrap()
}

/// Name of the `ApiError` variant, as used in the vector files.
fn kind(err: &ApiError) -> &'static str {
    match err {
        ApiError::RateLimited { .. } => "rate_limited",
        ApiError::Unauthorized { .. } => "unauthorized",
        ApiError::BadRequest { .. } => "bad_request",
        ApiError::NotFound { .. } => "not_found",
        ApiError::Remote(_) => "remote",
        ApiError::RemoteRaw { .. } => "remote_raw",
        ApiError::RemoteUnreadable { .. } => "remote_unreadable",
        ApiError::Deserialization(_) => "deserialization",
        other => panic!("unexpected error variant: {other:?}"),
    }
}

fn strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().map(|v| v.as_str().unwrap().to_string()).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

#[test]
fn validate_test_vectors() {
    let raw = include_str!("../../test-vectors/validate.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];

        let mut response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap().to_string(),
        )
        .with_reason(sim["reason"].as_str().unwrap());
        for h in sim["headers"].as_array().unwrap() {
            let pair = strings(h);
            response = response.with_header(pair[0].clone(), pair[1].clone());
        }

        let result = c.validate_response(&mut response);
        let expected = &case["expected"];
        if expected["ok"].as_bool() == Some(true) {
            assert!(result.is_ok(), "{name}: expected ok, got {result:?}");
        } else {
            let err = result.unwrap_err();
            assert_eq!(kind(&err), expected["kind"].as_str().unwrap(), "{name}: kind");
            assert_eq!(err.to_string(), expected["message"].as_str().unwrap(), "{name}: message");
        }

        let rate = c.rate_limit();
        let expected_rate = &case["expected_rate_limit"];
        assert_eq!(rate.limit, expected_rate["limit"].as_str().unwrap(), "{name}: limit");
        assert_eq!(rate.remaining, expected_rate["remaining"].as_str().unwrap(), "{name}: remaining");
        assert!(rate.last_updated.is_some(), "{name}: last_updated");
    }
}

// ---------------------------------------------------------------------------
// Parks
// ---------------------------------------------------------------------------

/// Returns one canned response and keeps the request it was asked to send.
struct Canned {
    status: u16,
    body: String,
    seen: Arc<Mutex<Option<HttpRequest>>>,
}

impl Transport for Canned {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.seen.lock() = Some(request);
        Ok(HttpResponse::new(self.status, self.body.clone()).with_reason("OK"))
    }
}

fn options_from(value: &serde_json::Value) -> ParksOptions {
    ParksOptions {
        park_code: strings(&value["park_code"]),
        state_code: strings(&value["state_code"]),
        limit: value["limit"].as_u64().map(|n| n as u32),
        start: value["start"].as_u64().map(|n| n as u32),
        q: value["q"].as_str().map(str::to_string),
        sort: strings(&value["sort"]),
    }
}

#[test]
fn parks_test_vectors() {
    let raw = include_str!("../../test-vectors/parks.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let seen = Arc::new(Mutex::new(None));
        let transport = Canned {
            status: sim["status"].as_u64().unwrap() as u16,
            body: sim["body"].as_str().unwrap().to_string(),
            seen: seen.clone(),
        };
        let api = Client::with_transport(ClientConfig::new("vector-key"), transport).unwrap();
        let nps = NpsClient::from_client(api);

        let parks = nps.parks().list(&options_from(&case["options"])).unwrap();

        // Verify build
        let req = seen.lock().take().unwrap();
        let expected_req = &case["expected_request"];
        assert_eq!(req.method.as_str(), expected_req["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(req.url.as_str(), expected_req["url"].as_str().unwrap(), "{name}: url");
        assert_eq!(req.header("X-Api-Key"), Some("vector-key"), "{name}: api key");
        assert!(req.body.is_none(), "{name}: body should be None");

        // Verify parse
        let expected = &case["expected_result"];
        assert_eq!(parks.total, expected["total"].as_str().unwrap(), "{name}: total");
        assert_eq!(parks.limit, expected["limit"].as_str().unwrap(), "{name}: limit");
        assert_eq!(parks.start, expected["start"].as_str().unwrap(), "{name}: start");
        let codes: Vec<String> = parks.data.iter().map(|p| p.park_code.clone()).collect();
        assert_eq!(codes, strings(&expected["codes"]), "{name}: park codes");
    }
}

#[test]
fn parks_decode_failure_is_deserialization_error() {
    let transport = Canned {
        status: 200,
        body: r#"{"data":"not a list"}"#.to_string(),
        seen: Arc::default(),
    };
    let api = Client::with_transport(ClientConfig::new("vector-key"), transport).unwrap();
    let err = NpsClient::from_client(api).parks().list(&ParksOptions::new()).unwrap_err();
    assert_eq!(kind(&err), "deserialization");
    assert!(err.to_string().starts_with("unable to decode json response: "));
}

#[test]
fn request_vectors_use_fixed_headers() {
    let req = client().new_request(HttpMethod::Delete, "parks/yell", []).unwrap();
    assert_eq!(req.url.as_str(), "https://developer.nps.gov/api/v1/parks/yell");
    assert_eq!(req.header("accept"), Some("application/json; charset=utf-8"));
    assert_eq!(req.header("x-api-key"), Some("vector-key"));
}
