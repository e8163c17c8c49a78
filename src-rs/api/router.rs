//! Router-mounted entry points. Each axum handler converts the live request
//! into an `ApiRequest` (or a `FunctionEvent`) and renders the result.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::function::{self, FunctionEvent, FunctionName, FunctionResponse};
use super::http::{ApiRequest, ApiResponse, CorsPolicy};
use super::state::AppState;
use crate::error::ApiError;

/// Buffers and decodes the body. Rejections are reshaped so they carry the
/// route's JSON and CORS headers like every other response.
fn read_body(body: Result<Bytes, BytesRejection>) -> Result<String, ApiError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Request body is too large.".to_string())
        } else {
            ApiError::Validation(rejection.body_text())
        }
    })?;
    String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::Validation("Request body is not valid UTF-8.".to_string()))
}

fn to_request(
    method: Method,
    query: HashMap<String, String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiRequest, ApiError> {
    let body = read_body(body)?;
    Ok(ApiRequest {
        method,
        query,
        body: None,
    }
    .with_body(body))
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

pub async fn handle_generate(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    match to_request(method, query, body) {
        Ok(req) => state.generate.handle(req).await,
        Err(err) => ApiResponse::error(err, CorsPolicy::GENERATE),
    }
}

pub async fn handle_tasks(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResponse {
    match to_request(method, query, body) {
        Ok(req) => state.tasks.handle(req).await,
        Err(err) => ApiResponse::error(err, CorsPolicy::TASKS),
    }
}

/// Serves `/.netlify/functions/{name}` through the function adapter.
pub async fn handle_function(
    State(state): State<AppState>,
    Path(name): Path<String>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let resp = match name.parse::<FunctionName>() {
        Ok(function_name) => match read_body(body) {
            Ok(body) => {
                let event = FunctionEvent {
                    http_method: method.to_string(),
                    query_string_parameters: Some(query),
                    body: Some(body),
                    is_base64_encoded: false,
                };
                function::invoke(&state, function_name, event).await
            }
            Err(err) => ApiResponse::error(err, function_name.cors()).into(),
        },
        Err(_) => function::not_found(&name),
    };
    render_function_response(resp)
}

fn render_function_response(resp: FunctionResponse) -> Response {
    let status = StatusCode::from_u16(resp.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, resp.body).into_response();
    let headers = response.headers_mut();
    for (name, value) in resp.headers {
        if let (Ok(name), Ok(value)) = (
            axum::http::HeaderName::from_bytes(name.as_bytes()),
            axum::http::HeaderValue::from_str(&value),
        ) {
            headers.insert(name, value);
        }
    }
    response
}
