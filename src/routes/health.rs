use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness only; the database is not touched.
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
