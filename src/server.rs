use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use crate::error::{FailureStage, PipelineFailure, ServiceError};
use crate::pipeline::{PipelineResult, QueryRequest};
use crate::state::ServerState;
use crate::store::OUTPUT_ROUTE;

pub type AppState = Arc<ServerState>;

/// `/query` body, accepted as JSON or as an HTML form post.
pub struct QueryInput(pub QueryRequest);

#[async_trait]
impl<S> FromRequest<S> for QueryInput
where
    S: Send + Sync,
{
    type Rejection = PipelineFailure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(body) = Json::<QueryRequest>::from_request(req, state)
                .await
                .map_err(|rejection| malformed_body(rejection.body_text()))?;
            Ok(Self(body))
        } else {
            let Form(body) = Form::<QueryRequest>::from_request(req, state)
                .await
                .map_err(|rejection| malformed_body(rejection.body_text()))?;
            Ok(Self(body))
        }
    }
}

/// Undecodable bodies share the pipeline's validation error shape.
fn malformed_body(detail: String) -> PipelineFailure {
    PipelineFailure::new(FailureStage::Validation, ServiceError::Validation(detail))
}

impl IntoResponse for PipelineFailure {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = json!({
            "error": self.to_string(),
            "stage": self.stage.as_str(),
        });
        (status, Json(body)).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let output_root = state.pipeline.store().root().to_path_buf();
    let public_dir = state.public_dir.clone();

    Router::new()
        .route("/", get(serve_index))
        .route("/query", post(handle_query))
        .nest_service(OUTPUT_ROUTE, ServeDir::new(output_root))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

pub async fn start_server(
    port: u16,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let log = state.log.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", port)
    } else {
        addr.to_string()
    };
    info!("🚀 Voiceline server running on http://{}", display_addr);
    log.append(&format!("Server is running on port {}", port));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log.append("Server stopped");
    Ok(())
}

async fn serve_index(State(state): State<AppState>, req: Request) -> Response {
    let index = state.public_dir.join("index.html");
    match ServeFile::new(index).oneshot(req).await {
        Ok(res) => {
            if res.status().is_success() {
                state.log.append("GET / - Served index.html");
            }
            res.into_response()
        }
        Err(err) => {
            error!("ServeFile error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn handle_query(
    State(state): State<AppState>,
    QueryInput(payload): QueryInput,
) -> Result<Json<PipelineResult>, PipelineFailure> {
    info!("Query received: prompt={:?} line={:?}", payload.prompt, payload.line);
    state
        .log
        .append(&format!("POST /query - prompt: {:?}, line: {:?}", payload.prompt, payload.line));

    let result = state.pipeline.run(&payload).await?;
    state
        .log
        .append(&format!("POST /query - Served {}", result.audio_path));
    Ok(Json(result))
}
