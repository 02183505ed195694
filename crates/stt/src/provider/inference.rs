use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use crate::{
    error::{Result, SttError},
    http_client::http_client,
    staging::StagedAudioFile,
    types::TranscriptionResponse,
};

use super::SttProvider;

/// Hosted inference endpoint taking raw audio bytes (Hugging Face Inference API style)
///
/// Request: `POST <endpoint>` with the audio as body, bearer auth and the
/// upload's content type. Response: `{ "text": ... }` or `{ "error": ... }`.
pub(crate) struct InferenceProvider {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    name: String,
}

impl InferenceProvider {
    pub fn new(name: String, endpoint: Url, timeout: Duration) -> Self {
        Self {
            client: http_client(),
            endpoint,
            timeout,
            name,
        }
    }
}

#[derive(serde::Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl SttProvider for InferenceProvider {
    async fn transcribe(&self, audio: &StagedAudioFile, api_key: &SecretString) -> Result<TranscriptionResponse> {
        let body = audio.read().await?;

        tracing::debug!(
            audio_id = %audio.id(),
            bytes = body.len(),
            endpoint = %self.endpoint,
            "sending audio to inference endpoint"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key.expose_secret())
            .header(CONTENT_TYPE, audio.content_type())
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            let detail = error_detail(&text);
            tracing::error!(audio_id = %audio.id(), %status, "inference API error: {detail}");

            return Err(SttError::UpstreamError(detail));
        }

        parse_transcription(&text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl InferenceProvider {
    fn transport_error(&self, error: &reqwest::Error) -> SttError {
        tracing::error!(endpoint = %self.endpoint, "network error reaching inference API: {error}");

        let reason = if error.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if error.is_connect() {
            "connection failed".to_string()
        } else {
            "request failed".to_string()
        };

        SttError::UpstreamUnavailable(reason)
    }
}

/// Pull a readable message out of a failed response body
///
/// Prefers the JSON `error` field, falling back to the raw body.
fn error_detail(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned())
        .map(|error| match error {
            Value::String(message) => message,
            other => other.to_string(),
        });

    from_json.unwrap_or_else(|| {
        let raw = body.trim();
        if raw.is_empty() {
            "Unknown error".to_string()
        } else {
            raw.to_string()
        }
    })
}

fn parse_transcription(body: &str) -> Result<TranscriptionResponse> {
    let parsed: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| SttError::InternalError(format!("failed to parse inference response: {e}")))?;

    Ok(TranscriptionResponse {
        text: parsed.text.unwrap_or_default(),
    })
}
