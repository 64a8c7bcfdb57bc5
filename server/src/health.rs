use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthCheckResponse {
    status: String,
    provider_configured: bool,
    uploads: u64,
    edits: u64,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let response = HealthCheckResponse {
        status: "ok".to_string(),
        provider_configured: state.editor.is_configured(),
        uploads: state.request_counter.upload_count(),
        edits: state.request_counter.edit_count(),
    };
    Json(response)
}
