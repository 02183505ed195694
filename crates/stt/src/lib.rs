#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod http_client;
mod provider;
mod request;
mod sanitize;
mod server;
mod staging;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::post,
};

pub use error::{Result, SttError};
pub use sanitize::{ALLOWED_AUDIO_TYPES, DEFAULT_FILENAME, sanitize_filename, validate_mime_type};
pub use server::Server;
pub use staging::{AudioStore, StagedAudioFile};
pub use types::TranscriptionResponse;
use server::SttServerBuilder;

/// Build the STT relay from configuration
///
/// # Errors
///
/// Returns an error if the staging directory cannot be created
pub fn build_server(config: &quill_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        SttServerBuilder::new(&config.stt)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize STT relay: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for STT
pub fn endpoint_router(server: Arc<Server>) -> Router {
    let body_limit = request::body_limit(server.max_audio_size());

    Router::new()
        .route("/stt", post(speech_to_text))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(server)
}

/// Handle `POST /stt`
async fn speech_to_text(
    State(server): State<Arc<Server>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptionResponse>> {
    let multipart = multipart.map_err(|rejection| request::rejection_error(&rejection))?;

    let response = server.spawn_relay(multipart).await?;

    Ok(Json(response))
}
