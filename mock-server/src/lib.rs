use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "DEMO_KEY";
pub const DEFAULT_HOURLY_LIMIT: u32 = 1000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Park {
    pub id: String,
    pub url: String,
    pub full_name: String,
    pub park_code: String,
    pub description: String,
    pub states: String,
    pub designation: String,
    pub name: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParksQuery {
    pub park_code: Option<String>,
    pub state_code: Option<String>,
    pub limit: Option<usize>,
    pub start: Option<usize>,
    pub q: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub api_key: String,
    pub hourly_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            hourly_limit: DEFAULT_HOURLY_LIMIT,
        }
    }
}

pub struct AppState {
    config: ServerConfig,
    remaining: RwLock<u32>,
    parks: Vec<Park>,
}

pub type SharedState = Arc<AppState>;

pub fn app() -> Router {
    app_with(ServerConfig::default())
}

pub fn app_with(config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        remaining: RwLock::new(config.hourly_limit),
        config,
        parks: seed_parks(),
    });
    Router::new()
        .route("/api/v1/parks", get(list_parks))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ServerConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: ServerConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn seed_parks() -> Vec<Park> {
    let park = |code: &str, full_name: &str, name: &str, states: &str, description: &str| Park {
        id: Uuid::new_v4().to_string().to_uppercase(),
        url: format!("https://www.nps.gov/{code}/index.htm"),
        full_name: full_name.to_string(),
        park_code: code.to_string(),
        description: description.to_string(),
        states: states.to_string(),
        designation: "National Park".to_string(),
        name: name.to_string(),
    };
    vec![
        park("acad", "Acadia National Park", "Acadia", "ME", "Granite peaks and rocky shoreline."),
        park("grte", "Grand Teton National Park", "Grand Teton", "WY", "Jagged peaks above Jackson Hole."),
        park("jotr", "Joshua Tree National Park", "Joshua Tree", "CA", "Two deserts meet."),
        park("yell", "Yellowstone National Park", "Yellowstone", "ID,MT,WY", "Geysers and hot springs."),
        park("yose", "Yosemite National Park", "Yosemite", "CA", "Granite cliffs and waterfalls."),
    ]
}

fn error_envelope(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

/// Checks the key and charges one request against the quota.
///
/// Returns the quota left, or the response to send instead.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<u32, Response> {
    let Some(key) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) else {
        return Err(error_envelope(
            StatusCode::FORBIDDEN,
            "API_KEY_MISSING",
            "No api_key was supplied. Get one at https://www.nps.gov/subjects/developer/get-started.htm",
        ));
    };
    if key != state.config.api_key {
        return Err(error_envelope(
            StatusCode::FORBIDDEN,
            "API_KEY_INVALID",
            "An invalid api_key was supplied. Get one at https://www.nps.gov/subjects/developer/get-started.htm",
        ));
    }

    let mut remaining = state.remaining.write().await;
    if *remaining == 0 {
        tracing::info!("rejecting request over hourly limit");
        let resp = error_envelope(
            StatusCode::TOO_MANY_REQUESTS,
            "OVER_RATE_LIMIT",
            "You have exceeded your rate limit. Try again later.",
        );
        return Err(with_rate_limit(resp, state.config.hourly_limit, 0));
    }
    *remaining -= 1;
    Ok(*remaining)
}

fn with_rate_limit(mut resp: Response, limit: u32, remaining: u32) -> Response {
    let headers = resp.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    resp
}

fn split_codes(codes: Option<&str>) -> Vec<String> {
    codes
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

pub fn filter_parks<'a>(parks: &'a [Park], query: &ParksQuery) -> Vec<&'a Park> {
    let park_codes = split_codes(query.park_code.as_deref());
    let state_codes = split_codes(query.state_code.as_deref());
    let needle = query.q.as_deref().map(str::to_lowercase);

    parks
        .iter()
        .filter(|p| park_codes.is_empty() || park_codes.contains(&p.park_code))
        .filter(|p| {
            state_codes.is_empty()
                || p.states
                    .split(',')
                    .any(|s| state_codes.contains(&s.to_lowercase()))
        })
        .filter(|p| match &needle {
            Some(n) => p.full_name.to_lowercase().contains(n) || p.description.to_lowercase().contains(n),
            None => true,
        })
        .collect()
}

async fn list_parks(
    State(state): State<SharedState>,
    headers: HeaderMap,
    query: Result<Query<ParksQuery>, QueryRejection>,
) -> Response {
    let remaining = match authorize(&state, &headers).await {
        Ok(remaining) => remaining,
        Err(resp) => return resp,
    };
    let limit = state.config.hourly_limit;

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            let resp = (StatusCode::BAD_REQUEST, rejection.body_text()).into_response();
            return with_rate_limit(resp, limit, remaining);
        }
    };

    let matched = filter_parks(&state.parks, &query);
    let start = query.start.unwrap_or(0);
    let page_size = query.limit.unwrap_or(50);
    let data: Vec<&Park> = matched.iter().skip(start).take(page_size).copied().collect();

    let body = json!({
        "total": matched.len().to_string(),
        "limit": page_size.to_string(),
        "start": start.to_string(),
        "data": data,
    });
    with_rate_limit((StatusCode::OK, Json(body)).into_response(), limit, remaining)
}
