use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::http::{ApiRequest, ApiResponse, CorsPolicy};
use crate::error::ApiError;
use crate::llm::TextGenerator;
use crate::task::{NewTask, TaskId, TaskPatch, TaskStore};

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: &'static str,
    pub response: String,
}

/// Prompt proxy. Shared by the `gemini` function and the `/api/gemini-analysis` route.
pub struct GenerateHandler {
    generator: Arc<dyn TextGenerator>,
}

impl GenerateHandler {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn handle(&self, req: ApiRequest) -> ApiResponse {
        let cors = CorsPolicy::GENERATE;
        if req.method == Method::OPTIONS {
            return ApiResponse::preflight(cors);
        }
        match self.dispatch(req).await {
            Ok(resp) => resp,
            Err(err) => ApiResponse::error(err, cors),
        }
    }

    async fn dispatch(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        if req.method != Method::POST {
            return Err(ApiError::MethodNotAllowed(
                "Method Not Allowed. Only POST is supported.".to_string(),
            ));
        }
        let prompt = extract_prompt(&req)?;
        let text = self.generator.generate(&prompt).await?;
        Ok(ApiResponse::json(
            StatusCode::OK,
            &GenerateResponse {
                message: "Gemini API call successful",
                response: text,
            },
            CorsPolicy::GENERATE,
        ))
    }
}

fn extract_prompt(req: &ApiRequest) -> Result<String, ApiError> {
    let missing = || ApiError::Validation("Prompt is required in the request body.".to_string());
    let body: Value = req.json_body().map_err(|_| missing())?;
    body.get("prompt")
        .and_then(|v| v.as_str())
        .filter(|prompt| !prompt.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(missing)
}

/// Task CRUD. `store` is `None` when no database is configured.
pub struct TaskHandler {
    store: Option<Arc<dyn TaskStore>>,
}

impl TaskHandler {
    pub fn new(store: Option<Arc<dyn TaskStore>>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, req: ApiRequest) -> ApiResponse {
        let cors = CorsPolicy::TASKS;
        if req.method == Method::OPTIONS {
            return ApiResponse::preflight(cors);
        }
        match self.dispatch(req).await {
            Ok(resp) => resp,
            Err(err) => ApiResponse::error(err, cors),
        }
    }

    fn store(&self) -> Result<&Arc<dyn TaskStore>, ApiError> {
        self.store.as_ref().ok_or_else(|| {
            ApiError::Configuration(
                "DATABASE_URL environment variable is not set.".to_string(),
            )
        })
    }

    async fn dispatch(&self, req: ApiRequest) -> Result<ApiResponse, ApiError> {
        let cors = CorsPolicy::TASKS;
        match req.method {
            Method::GET => match req.query_param("id") {
                Some(raw) => {
                    let id: TaskId = raw.parse()?;
                    let task = self.store()?.find_by_id(&id).await?;
                    Ok(ApiResponse::json(StatusCode::OK, &task, cors))
                }
                None => {
                    let tasks = self.store()?.find_all().await?;
                    Ok(ApiResponse::json(StatusCode::OK, &tasks, cors))
                }
            },
            Method::POST => {
                let fields: NewTask = req.json_body()?;
                fields.validate().map_err(ApiError::Validation)?;
                let task = self.store()?.insert(fields).await?;
                Ok(ApiResponse::json(StatusCode::CREATED, &task, cors))
            }
            Method::PUT => {
                let raw = req.query_param("id").ok_or_else(|| {
                    ApiError::Validation("Task ID is required for update".to_string())
                })?;
                let id: TaskId = raw.parse()?;
                let patch: TaskPatch = req.json_body()?;
                patch.validate().map_err(ApiError::Validation)?;
                let task = self.store()?.update_by_id(&id, patch).await?;
                Ok(ApiResponse::json(StatusCode::OK, &task, cors))
            }
            Method::DELETE => {
                let raw = req.query_param("id").ok_or_else(|| {
                    ApiError::Validation("Task ID is required for deletion".to_string())
                })?;
                let id: TaskId = raw.parse()?;
                self.store()?.delete_by_id(&id).await?;
                Ok(ApiResponse::message(
                    StatusCode::OK,
                    "Task deleted successfully",
                    cors,
                ))
            }
            _ => Err(ApiError::MethodNotAllowed("Method Not Allowed".to_string())),
        }
    }
}
