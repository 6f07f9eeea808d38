// src/handlers/control.rs

//! HTTP control surface: `POST /start`, `POST /stop` and `GET /health`.

use crate::error::{AppError, Result};
use crate::poller::RunState;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
};
use http_body_util::LengthLimitError;
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::error::Error as _;
use std::sync::Arc;
use tracing::{debug, info};

/// Body of `POST /start`.
///
/// The `Endpoint` key is matched case-insensitively and unknown keys are
/// ignored. A `null` value counts as absent.
#[derive(Debug, Default)]
pub struct StartRequest {
    pub endpoint: Option<String>,
}

impl<'de> Deserialize<'de> for StartRequest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        let mut endpoint = None;
        for (key, value) in fields {
            if !key.eq_ignore_ascii_case("endpoint") {
                continue;
            }
            endpoint = match value {
                Value::Null => None,
                Value::String(endpoint) => Some(endpoint),
                other => {
                    return Err(D::Error::custom(format!(
                        "invalid type for {key}: expected a string, found {other}"
                    )))
                }
            };
        }

        Ok(Self { endpoint })
    }
}

pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    body: Body,
) -> Result<StatusCode> {
    if state.controller.run_state() == RunState::Running {
        return Err(AppError::AlreadyRunning);
    }

    info!("Starting...");
    let payload = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| body_read_error(&e, state.max_body_bytes))?;

    // A literal `null` body is valid JSON and behaves like `{}`.
    let request = serde_json::from_slice::<Option<StartRequest>>(&payload)
        .map_err(|e| AppError::invalid_request(format!("Error while decoding request: {e}")))?
        .unwrap_or_default();

    let host = request_host(&headers, &uri);
    state.controller.start(request.endpoint.as_deref(), &host)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    if !state.controller.stop() {
        debug!("Stop requested while no poll run is active");
    }
    StatusCode::NO_CONTENT
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    debug!("Checking health...");
    let payload = serde_json::to_vec(&state.controller.health())?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        payload,
    ))
}

/// Answers methods a route must refuse even though axum would serve them
/// implicitly, such as `HEAD` on a `GET` route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")])
}

/// Host the request was addressed to, used as the default poll target.
fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|authority| authority.as_str().to_string()))
        .unwrap_or_default()
}

fn body_read_error(err: &axum::Error, max_size: usize) -> AppError {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return AppError::RequestTooLarge { max_size };
        }
        source = cause.source();
    }

    AppError::BodyRead {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_start_request_field_names() {
        let request: StartRequest = serde_json::from_str(r#"{"Endpoint": "http://x"}"#).unwrap();
        assert_eq!(request.endpoint.as_deref(), Some("http://x"));

        let request: StartRequest = serde_json::from_str(r#"{"endpoint": "x:1234"}"#).unwrap();
        assert_eq!(request.endpoint.as_deref(), Some("x:1234"));

        let request: StartRequest = serde_json::from_str("{}").unwrap();
        assert!(request.endpoint.is_none());
    }

    #[test]
    fn test_start_request_field_name_ignores_case() {
        for body in [
            r#"{"ENDPOINT": "x:1"}"#,
            r#"{"EndPoint": "x:1"}"#,
            r#"{"endPOINT": "x:1", "Other": 7}"#,
        ] {
            let request: StartRequest = serde_json::from_str(body).unwrap();
            assert_eq!(request.endpoint.as_deref(), Some("x:1"), "{body}");
        }

        let request: StartRequest = serde_json::from_str(r#"{"Endpoint": null}"#).unwrap();
        assert!(request.endpoint.is_none());
    }

    #[test]
    fn test_start_request_rejects_non_json() {
        assert!(serde_json::from_str::<StartRequest>("").is_err());
        assert!(serde_json::from_str::<StartRequest>("Endpoint=x").is_err());
        assert!(serde_json::from_str::<StartRequest>("[1, 2]").is_err());
        assert!(serde_json::from_str::<StartRequest>(r#"{"Endpoint": 5}"#).is_err());
    }

    #[test]
    fn test_null_body_is_an_empty_request() {
        let request = serde_json::from_str::<Option<StartRequest>>("null")
            .unwrap()
            .unwrap_or_default();
        assert!(request.endpoint.is_none());
    }

    #[test]
    fn test_request_host_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("drroute.local:8080"));
        let uri: Uri = "http://other:1/start".parse().unwrap();
        assert_eq!(request_host(&headers, &uri), "drroute.local:8080");
    }

    #[test]
    fn test_request_host_falls_back_to_uri() {
        let uri: Uri = "http://other:1/start".parse().unwrap();
        assert_eq!(request_host(&HeaderMap::new(), &uri), "other:1");

        let uri: Uri = "/start".parse().unwrap();
        assert_eq!(request_host(&HeaderMap::new(), &uri), "");
    }
}
