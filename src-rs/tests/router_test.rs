use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskgen_rs::api::{build_router, AppState};
use taskgen_rs::llm::ScriptedGenerator;
use taskgen_rs::task::{MemoryTaskStore, TaskStore};
use tower::ServiceExt;

fn app_with(generator: Arc<ScriptedGenerator>) -> Router {
    let store: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
    build_router(AppState::new(generator, Some(store)))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, HeaderMap) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value, headers)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app_with(Arc::new(ScriptedGenerator::new(vec![])));
    let (status, body, _) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn router_and_function_entry_points_share_generation_contract() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok("from router".to_string()),
        Ok("from function".to_string()),
    ]));
    let app = app_with(generator.clone());

    let (status, body, headers) = send(
        &app,
        "POST",
        "/api/gemini-analysis",
        Some(json!({"prompt": "a"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Gemini API call successful", "response": "from router"})
    );
    assert_eq!(headers["access-control-allow-origin"], "*");

    let (status, body, _) = send(
        &app,
        "POST",
        "/.netlify/functions/gemini",
        Some(json!({"prompt": "b"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "Gemini API call successful", "response": "from function"})
    );
    assert_eq!(generator.prompts(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn preflight_is_204_on_every_route() {
    let generator = Arc::new(ScriptedGenerator::new(vec![]));
    let app = app_with(generator.clone());

    for uri in [
        "/api/gemini-analysis",
        "/api/tasks",
        "/.netlify/functions/gemini",
        "/.netlify/functions/tasks",
    ] {
        let (status, body, headers) = send(&app, "OPTIONS", uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{uri}");
        assert_eq!(body, Value::Null, "{uri}");
        assert_eq!(headers["access-control-allow-origin"], "*", "{uri}");
        assert_eq!(
            headers["access-control-allow-headers"],
            "Content-Type, Authorization",
            "{uri}"
        );
        assert!(headers.contains_key("access-control-allow-methods"), "{uri}");
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn get_on_generation_route_is_405() {
    let generator = Arc::new(ScriptedGenerator::new(vec![]));
    let app = app_with(generator.clone());

    let (status, _, _) = send(&app, "GET", "/api/gemini-analysis", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _, _) = send(&app, "GET", "/.netlify/functions/gemini", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn task_crud_over_http() {
    let app = app_with(Arc::new(ScriptedGenerator::new(vec![])));

    let (status, created, _) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({"title": "Ship release", "status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched, _) =
        send(&app, "GET", &format!("/.netlify/functions/tasks?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks?id={id}"),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    let (status, all, _) = send(&app, "GET", "/.netlify/functions/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().map(Vec::len), Some(1));

    let (status, body, _) = send(&app, "DELETE", &format!("/api/tasks?id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Task deleted successfully"}));

    let (status, body, _) = send(&app, "GET", &format!("/api/tasks?id={id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Task not found"}));
}

#[tokio::test]
async fn put_and_delete_without_id_are_400() {
    let app = app_with(Arc::new(ScriptedGenerator::new(vec![])));

    let (status, body, _) = send(&app, "PUT", "/api/tasks", Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Task ID is required for update"}));

    let (status, body, _) = send(&app, "DELETE", "/.netlify/functions/tasks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Task ID is required for deletion"}));
}

#[tokio::test]
async fn unknown_function_is_404() {
    let app = app_with(Arc::new(ScriptedGenerator::new(vec![])));
    let (status, body, _) = send(&app, "POST", "/.netlify/functions/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Function not found"}));
}

#[tokio::test]
async fn tasks_route_without_database_is_500() {
    let generator: Arc<ScriptedGenerator> = Arc::new(ScriptedGenerator::new(vec![]));
    let app = build_router(AppState::new(generator, None));

    let (status, body, headers) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
    assert_eq!(headers["content-type"], "application/json");
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: Vec<u8>,
) -> (StatusCode, Value, HeaderMap) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap(), headers)
}

#[tokio::test]
async fn invalid_utf8_body_is_400_on_both_entry_points() {
    let app = app_with(Arc::new(ScriptedGenerator::new(vec![])));
    let body = b"{\"title\":\"a\xFFb\"}".to_vec();

    for uri in ["/api/tasks", "/.netlify/functions/tasks"] {
        let (status, value, headers) = send_raw(&app, "POST", uri, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(value, json!({"message": "Request body is not valid UTF-8."}), "{uri}");
        assert_eq!(headers["access-control-allow-origin"], "*", "{uri}");
    }

    let (_, all, _) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn oversized_body_is_413_with_json_and_cors_headers() {
    let generator = Arc::new(ScriptedGenerator::new(vec![]));
    let app = app_with(generator.clone());
    let prompt = "x".repeat(3 * 1024 * 1024);
    let body = json!({ "prompt": prompt }).to_string().into_bytes();

    for uri in ["/api/gemini-analysis", "/.netlify/functions/gemini"] {
        let (status, value, headers) = send_raw(&app, "POST", uri, body.clone()).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE, "{uri}");
        assert_eq!(value, json!({"message": "Request body is too large."}), "{uri}");
        assert_eq!(headers["content-type"], "application/json", "{uri}");
        assert_eq!(headers["access-control-allow-origin"], "*", "{uri}");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS", "{uri}");
    }
    assert_eq!(generator.calls(), 0);
}
