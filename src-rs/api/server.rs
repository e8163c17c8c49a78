use std::future::Future;
use std::net::SocketAddr;

use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::{info, Level};

use crate::api::router::{handle_function, handle_generate, handle_health, handle_tasks};
use crate::api::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/gemini-analysis", any(handle_generate))
        .route("/api/tasks", any(handle_tasks))
        .route("/.netlify/functions/:name", any(handle_function))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .with_state(state)
}

pub struct ApiServer {
    pub port: u16,
    pub state: AppState,
}

impl ApiServer {
    pub fn new(port: u16, state: AppState) -> Self {
        Self { port, state }
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), String>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "taskgen listening");
        axum::Server::try_bind(&addr)
            .map_err(|err| err.to_string())?
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| err.to_string())
    }
}
