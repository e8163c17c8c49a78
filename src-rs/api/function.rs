//! Serverless-function calling convention: a JSON event in, a
//! `{statusCode, headers, body}` JSON document out.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use axum::http::{Method, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::http::{ApiRequest, ApiResponse, CorsPolicy};
use super::state::AppState;
use crate::error::ApiError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionEvent {
    pub fn into_request(self) -> Result<ApiRequest, ApiError> {
        let method = Method::from_bytes(self.http_method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ApiError::MethodNotAllowed("Method Not Allowed".to_string()))?;
        let body = match self.body {
            Some(body) if self.is_base64_encoded => {
                let bytes = STANDARD.decode(body.trim()).map_err(|_| {
                    ApiError::Validation("Request body is not valid base64.".to_string())
                })?;
                Some(String::from_utf8(bytes).map_err(|_| {
                    ApiError::Validation("Request body is not valid UTF-8.".to_string())
                })?)
            }
            other => other,
        };
        Ok(ApiRequest {
            method,
            query: self.query_string_parameters.unwrap_or_default(),
            body: body.filter(|body| !body.is_empty()),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<ApiResponse> for FunctionResponse {
    fn from(resp: ApiResponse) -> Self {
        let headers = resp
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (display_header_name(name.as_str()), value.to_string()))
            })
            .collect();
        Self {
            status_code: resp.status.as_u16(),
            headers,
            body: resp.body,
        }
    }
}

/// `access-control-allow-origin` -> `Access-Control-Allow-Origin`.
fn display_header_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionName {
    Gemini,
    Tasks,
}

impl FunctionName {
    pub fn cors(&self) -> CorsPolicy {
        match self {
            FunctionName::Gemini => CorsPolicy::GENERATE,
            FunctionName::Tasks => CorsPolicy::TASKS,
        }
    }
}

impl FromStr for FunctionName {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "gemini" => Ok(FunctionName::Gemini),
            "tasks" => Ok(FunctionName::Tasks),
            other => Err(format!("unknown function: {}", other)),
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionName::Gemini => write!(f, "gemini"),
            FunctionName::Tasks => write!(f, "tasks"),
        }
    }
}

pub async fn invoke(state: &AppState, name: FunctionName, event: FunctionEvent) -> FunctionResponse {
    debug!(function = %name, method = %event.http_method, "invoking function");
    let req = match event.into_request() {
        Ok(req) => req,
        Err(err) => return ApiResponse::error(err, name.cors()).into(),
    };
    let resp = match name {
        FunctionName::Gemini => state.generate.handle(req).await,
        FunctionName::Tasks => state.tasks.handle(req).await,
    };
    resp.into()
}

pub fn not_found(name: &str) -> FunctionResponse {
    warn!(function = name, "unknown function requested");
    ApiResponse::message(StatusCode::NOT_FOUND, "Function not found", CorsPolicy::TASKS).into()
}
