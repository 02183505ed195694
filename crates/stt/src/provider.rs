pub(crate) mod inference;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::{staging::StagedAudioFile, types::TranscriptionResponse};

/// Remote speech-to-text backend receiving staged uploads
#[async_trait]
pub(crate) trait SttProvider: Send + Sync {
    /// Send the staged audio and return its transcription
    async fn transcribe(
        &self,
        audio: &StagedAudioFile,
        api_key: &SecretString,
    ) -> crate::error::Result<TranscriptionResponse>;

    /// Get the provider name
    fn name(&self) -> &str;
}
