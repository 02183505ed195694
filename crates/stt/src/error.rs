use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::sanitize::ALLOWED_AUDIO_TYPES;

pub type Result<T> = std::result::Result<T, SttError>;

const MIB: u64 = 1024 * 1024;

/// Speech-to-text relay errors with their HTTP status codes
///
/// Every variant is terminal for the request. Nothing is retried.
#[derive(Debug, Error)]
pub enum SttError {
    /// Declared audio type is not in the allow-list
    #[error("Audio type {content_type} not supported. Allowed types: {}", ALLOWED_AUDIO_TYPES.join(", "))]
    UnsupportedMediaType { content_type: String },

    /// Request body is not `multipart/form-data`
    #[error("Unsupported Content-Type, expected: 'Content-Type: multipart/form-data'")]
    NotMultipart,

    /// Malformed multipart body or missing audio field
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload crossed the configured size limit
    #[error("Audio file size exceeds the maximum allowed size of {}", format_limit(.limit))]
    PayloadTooLarge { limit: u64 },

    /// No API key configured for the inference endpoint
    #[error("Transcription API key not configured")]
    ServerMisconfigured,

    /// Inference endpoint answered with a non-success status
    #[error("Transcription API error: {0}")]
    UpstreamError(String),

    /// Inference endpoint could not be reached or did not answer in time
    #[error("Error connecting to transcription API: {0}")]
    UpstreamUnavailable(String),

    /// Staging file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else; the detail is logged but never sent to the client
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl SttError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType { .. } | Self::NotMultipart => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerMisconfigured | Self::UpstreamError(_) | Self::Io(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short failure category used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::NotMultipart => "not_multipart",
            Self::InvalidRequest(_) => "invalid_request",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::ServerMisconfigured => "server_misconfigured",
            Self::UpstreamError(_) => "upstream_error",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Io(_) | Self::InternalError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::Io(_) | Self::InternalError(_) => "Error processing audio".to_string(),
            _ => self.to_string(),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_limit(bytes: &u64) -> String {
    if *bytes >= MIB {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Error body: `{ "detail": "..." }`
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
