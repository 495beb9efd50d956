//! Shared fixtures: an in-process stand-in for the IBGE municipality API.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FakeIbge {
    calls: Arc<AtomicUsize>,
}

impl FakeIbge {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn municipio(State(fake): State<FakeIbge>, Path(id): Path<String>) -> Response {
    fake.calls.fetch_add(1, Ordering::SeqCst);
    match id.as_str() {
        "3550308" => Json(serde_json::json!({"id": 3550308, "nome": "São Paulo"})).into_response(),
        "3509502" => Json(serde_json::json!({"id": 3509502, "nome": "Campinas"})).into_response(),
        // The real service answers unknown ids with an empty list.
        "9999999" => Json(serde_json::json!([])).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the fake lookup service; returns its handle and base URL.
pub async fn spawn_fake_ibge() -> (FakeIbge, String) {
    let fake = FakeIbge::default();
    let app = Router::new()
        .route("/municipios/:id", get(municipio))
        .with_state(fake.clone());
    let addr = spawn(app).await;
    (fake, format!("http://{}/municipios", addr))
}
