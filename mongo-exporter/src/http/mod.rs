//! HTTP API for the browser front end.
//!
//! Three POST endpoints (`connect`, `list-collections`, `export-data`) served
//! under `/api/` and under `/.netlify/functions/` so existing front ends work
//! unchanged. Preflight `OPTIONS` is answered with an empty 200 and any other
//! method gets 405.

use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, post};
use axum::{Json, Router, handler::Handler};
use mongo_exporter_core::error::ExportError;
use mongo_exporter_core::{ExportEngine, Result};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod handlers;

/// Path prefixes the endpoints are mounted under.
pub const ROUTE_PREFIXES: [&str; 2] = ["/api", "/.netlify/functions"];

/// State shared by the endpoint handlers.
#[derive(Clone)]
pub struct AppState {
    /// Engine every request runs against
    pub engine: Arc<ExportEngine>,
}

/// Failure body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Diagnostic text of the failure
    pub error: String,
}

/// Engine error rendered as an HTTP response.
///
/// Validation failures map to 400, everything else to 500.
#[derive(Debug)]
pub struct ApiError(pub ExportError);

impl From<ExportError> for ApiError {
    fn from(error: ExportError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = ErrorBody {
            success: false,
            error: self.0.diagnostic(),
        };
        (status, Json(body)).into_response()
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// POST endpoint with preflight and method rejection attached.
fn endpoint<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    post(handler)
        .options(preflight)
        .fallback(method_not_allowed)
}

/// Builds the CORS layer; an empty list or `*` allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let has_wildcard = origins.is_empty() || origins.iter().any(|o| o == "*");

    let cors = if has_wildcard {
        CorsLayer::new().allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| {
                o.parse()
                    .map_err(|_| tracing::warn!("Ignoring invalid CORS origin: {}", o))
                    .ok()
            })
            .collect();
        CorsLayer::new().allow_origin(allowed)
    };

    cors.allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Builds the API router over `engine`.
pub fn router(engine: ExportEngine, cors_origins: &[String]) -> Router {
    let state = AppState {
        engine: Arc::new(engine),
    };

    let mut routes = Router::new();
    for prefix in ROUTE_PREFIXES {
        routes = routes
            .route(&format!("{}/connect", prefix), endpoint(handlers::connect))
            .route(
                &format!("{}/list-collections", prefix),
                endpoint(handlers::list_collections),
            )
            .route(
                &format!("{}/export-data", prefix),
                endpoint(handlers::export_data),
            );
    }

    routes
        .with_state(state)
        .layer(build_cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Serves `router` on `addr` until Ctrl-C.
pub async fn serve(router: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ExportError::Io {
            context: format!("Failed to bind {}", addr),
            source: e,
        })?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ExportError::Io {
            context: "Server error".to_string(),
            source: e,
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
