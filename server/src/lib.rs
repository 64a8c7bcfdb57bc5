pub mod config;
pub mod edit;
pub mod error;
pub mod health;
pub mod media_ingestion;
pub mod processing;
pub mod request_counter;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::processing::{GeminiClient, ImageEditor};
use crate::request_counter::RequestCounter;

/// Headroom for multipart boundaries and the instruction field on top of the
/// file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub editor: Arc<ImageEditor>,
    pub request_counter: RequestCounter,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let request_counter = RequestCounter::new();
        let gemini_client = GeminiClient::from_config(&config.gemini)?;

        if gemini_client.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; /api/edit will fail until it is configured");
        }

        Ok(Self {
            editor: Arc::new(ImageEditor::new(gemini_client, request_counter.clone())),
            config: Arc::new(config),
            request_counter,
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/upload", post(media_ingestion::handle_file_upload))
        .route("/api/edit", post(edit::edit_handler))
        .nest_service(&state.config.upload_url_prefix, uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
