//! REST API server exposing the reports on `GET /?pergunta=N`.

use crate::dispatcher::{Answer, Dispatcher};
use crate::error::RadarError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const QUESTION_PARAM: &str = "pergunta";

/// API State - Shared between handlers
#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
}

impl ApiState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error wrapper that renders as `{"error": ...}` with a matching status.
pub struct ApiError(pub RadarError);

impl From<RadarError> for ApiError {
    fn from(e: RadarError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RadarError::UnknownQuestion => StatusCode::BAD_REQUEST,
            RadarError::EmptyReport(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn answer_question(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Answer>, ApiError> {
    let selector = params.get(QUESTION_PARAM).map(String::as_str);
    let answer = state.dispatcher.dispatch(selector).await?;
    Ok(Json(answer))
}

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(answer_question))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(addr: &str, state: ApiState) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Report server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
