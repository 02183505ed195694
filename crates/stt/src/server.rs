use std::sync::Arc;

use axum::extract::{Multipart, multipart::Field};
use futures_util::TryStreamExt;
use secrecy::SecretString;
use tokio_util::task::TaskTracker;

use crate::{
    error::{Result, SttError},
    provider::{SttProvider, inference::InferenceProvider},
    request::{AUDIO_FIELD, multipart_error},
    sanitize::{ALLOWED_AUDIO_TYPES, DEFAULT_FILENAME, sanitize_filename, staged_extension, validate_mime_type},
    staging::{AudioStore, StagedAudioFile},
    types::TranscriptionResponse,
};

/// Relay that stages uploads and forwards them to the inference endpoint
///
/// Holds only read-only settings. Per-request work and deferred cleanups
/// run on tasks tracked by `tasks` so they finish even if the client goes
/// away, and so shutdown can wait for them.
pub struct Server {
    provider: Box<dyn SttProvider>,
    store: AudioStore,
    api_key: Option<SecretString>,
    max_audio_size: u64,
    tasks: TaskTracker,
}

impl Server {
    pub(crate) fn new(
        provider: Box<dyn SttProvider>,
        store: AudioStore,
        api_key: Option<SecretString>,
        max_audio_size: u64,
    ) -> Self {
        Self {
            provider,
            store,
            api_key,
            max_audio_size,
            tasks: TaskTracker::new(),
        }
    }

    /// Staging store used for uploads
    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    /// Configured upload limit in bytes
    pub fn max_audio_size(&self) -> u64 {
        self.max_audio_size
    }

    /// Wait for in-flight relays and pending cleanups to finish
    ///
    /// Called on shutdown. New work can still be spawned afterwards.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Run the relay on a tracked task and wait for its result
    ///
    /// If the caller is dropped (client disconnect), the task keeps running
    /// and still performs its cleanup.
    pub(crate) async fn spawn_relay(self: Arc<Self>, multipart: Multipart) -> Result<TranscriptionResponse> {
        let server = Arc::clone(&self);

        self.tasks
            .spawn(async move { server.relay(multipart).await })
            .await
            .map_err(|e| SttError::InternalError(format!("relay task failed: {e}")))?
    }

    /// Find the audio field and relay it
    async fn relay(&self, mut multipart: Multipart) -> Result<TranscriptionResponse> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e, self.max_audio_size))?
        {
            if field.name() == Some(AUDIO_FIELD) {
                return self.relay_field(field).await;
            }

            tracing::debug!(field = field.name().unwrap_or_default(), "skipping multipart field");
        }

        Err(SttError::InvalidRequest(format!(
            "Missing required '{AUDIO_FIELD}' field in multipart form"
        )))
    }

    /// Validate, stage, forward, clean up
    async fn relay_field(&self, field: Field<'_>) -> Result<TranscriptionResponse> {
        let content_type = field.content_type().unwrap_or("unknown").to_owned();

        if !validate_mime_type(&content_type, ALLOWED_AUDIO_TYPES) {
            tracing::warn!(%content_type, "rejected audio file with unsupported type");
            return Err(SttError::UnsupportedMediaType { content_type });
        }

        let filename = sanitize_filename(field.file_name().unwrap_or(DEFAULT_FILENAME));
        let extension = staged_extension(&filename, &content_type);

        let max_audio_size = self.max_audio_size;
        let upload = field.map_err(move |e| multipart_error(&e, max_audio_size));

        let staged = self
            .store
            .stage(upload, &extension, &content_type, max_audio_size)
            .await?;

        match self.forward(&staged).await {
            Ok(response) => {
                tracing::info!(
                    audio_id = %staged.id(),
                    characters = response.text.chars().count(),
                    "transcribed audio"
                );

                self.schedule_removal(staged);
                Ok(response)
            }
            Err(error) => {
                tracing::error!(audio_id = %staged.id(), category = error.category(), "transcription failed: {error}");

                staged.remove().await;
                Err(error)
            }
        }
    }

    async fn forward(&self, staged: &StagedAudioFile) -> Result<TranscriptionResponse> {
        let Some(api_key) = &self.api_key else {
            return Err(SttError::ServerMisconfigured);
        };

        tracing::info!(
            audio_id = %staged.id(),
            size = staged.size(),
            content_type = staged.content_type(),
            provider = self.provider.name(),
            "processing audio file for transcription"
        );

        self.provider.transcribe(staged, api_key).await
    }

    /// Delete the staged file after the response has gone out
    fn schedule_removal(&self, staged: StagedAudioFile) {
        self.tasks.spawn(staged.remove());
    }
}

/// Builder for constructing the relay server from configuration
pub(crate) struct SttServerBuilder<'a> {
    config: &'a quill_config::SttConfig,
}

impl<'a> SttServerBuilder<'a> {
    pub fn new(config: &'a quill_config::SttConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let config = self.config;

        let store = AudioStore::new(&config.audio_dir)?;
        let provider = InferenceProvider::new("inference".to_string(), config.endpoint.clone(), config.timeout);
        let api_key = config.api_key().cloned();

        if api_key.is_none() {
            tracing::warn!("no transcription API key configured, /stt requests will fail");
        }

        tracing::debug!(
            audio_dir = %store.dir().display(),
            max_audio_size = config.max_audio_size,
            endpoint = %config.endpoint,
            "STT relay initialized"
        );

        Ok(Server::new(Box::new(provider), store, api_key, config.max_audio_size))
    }
}
