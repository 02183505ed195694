use axum::extract::multipart::{MultipartError, MultipartRejection};
use http::StatusCode;

use crate::error::SttError;

/// Multipart field carrying the audio file
pub(crate) const AUDIO_FIELD: &str = "audio";

/// Room left for multipart framing and small text fields on top of the audio limit (1 MiB)
const MULTIPART_OVERHEAD_BYTES: u64 = 1 << 20;

/// Transport-level cap on the whole request body
///
/// Set above the audio limit so the streaming size check, not the body
/// limit, decides whether the audio itself is too large.
pub(crate) fn body_limit(max_audio_size: u64) -> usize {
    usize::try_from(max_audio_size.saturating_add(MULTIPART_OVERHEAD_BYTES)).unwrap_or(usize::MAX)
}

/// Map a failure while reading the multipart body
pub(crate) fn multipart_error(error: &MultipartError, max_audio_size: u64) -> SttError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return SttError::PayloadTooLarge { limit: max_audio_size };
    }

    SttError::InvalidRequest(format!("Failed to read multipart body: {}", error.body_text()))
}

/// Map a request that could not be opened as multipart at all
pub(crate) fn rejection_error(rejection: &MultipartRejection) -> SttError {
    tracing::warn!("rejected upload that is not multipart/form-data: {rejection}");
    SttError::NotMultipart
}
