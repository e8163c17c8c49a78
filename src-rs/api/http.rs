use std::collections::HashMap;

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::error::ApiError;

/// Transport-neutral request handed to the canonical handlers.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        let body = body.into();
        self.body = if body.is_empty() { None } else { Some(body) };
        self
    }

    /// Non-blank query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = self
            .body
            .as_deref()
            .filter(|body| !body.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("Request body is required.".to_string()))?;
        serde_json::from_str(body)
            .map_err(|err| ApiError::Validation(format!("Invalid request body: {}", err)))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CorsPolicy {
    pub allow_methods: &'static str,
}

impl CorsPolicy {
    pub const ALLOW_HEADERS: &'static str = "Content-Type, Authorization";

    pub const GENERATE: CorsPolicy = CorsPolicy {
        allow_methods: "POST, OPTIONS",
    };

    pub const TASKS: CorsPolicy = CorsPolicy {
        allow_methods: "GET, POST, PUT, DELETE, OPTIONS",
    };

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(Self::ALLOW_HEADERS),
        );
        headers
    }
}

#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn preflight(cors: CorsPolicy) -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: cors.headers(),
            body: String::new(),
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T, cors: CorsPolicy) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self {
                status,
                headers: cors.headers(),
                body,
            },
            Err(err) => {
                error!(error = %err, "failed to serialize response body");
                Self::internal_error(&err.to_string(), cors)
            }
        }
    }

    pub fn message(status: StatusCode, message: &str, cors: CorsPolicy) -> Self {
        Self::json(status, &json!({ "message": message }), cors)
    }

    pub fn error(err: ApiError, cors: CorsPolicy) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %err, "request failed");
            Self::internal_error(&err.to_string(), cors)
        } else {
            warn!(status = status.as_u16(), error = %err, "request rejected");
            Self::message(status, &err.to_string(), cors)
        }
    }

    fn internal_error(detail: &str, cors: CorsPolicy) -> Self {
        let body = json!({ "message": "Internal Server Error", "error": detail });
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: cors.headers(),
            body: body.to_string(),
        }
    }

    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}
