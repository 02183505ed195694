use std::{path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use url::Url;

/// Hugging Face inference endpoint for Whisper large v3
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models/openai/whisper-large-v3";

/// Default upload cap (10 MiB)
pub const DEFAULT_MAX_AUDIO_SIZE: u64 = 10 * 1024 * 1024;

/// Default staging directory for uploaded audio
pub const DEFAULT_AUDIO_DIR: &str = "/tmp/quill-audio";

/// Default timeout for the upstream transcription call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Speech-to-text relay configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SttConfig {
    /// Remote inference endpoint receiving the raw audio bytes
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,
    /// Bearer token for the inference endpoint
    ///
    /// Hugging Face tokens and Whisper API keys are the same credential here.
    /// An empty value counts as unset.
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Maximum accepted audio size in bytes
    #[serde(default = "default_max_audio_size")]
    pub max_audio_size: u64,
    /// Directory holding staged uploads while they are forwarded
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    /// Upstream request timeout (e.g. "30s", "2m")
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            max_audio_size: DEFAULT_MAX_AUDIO_SIZE,
            audio_dir: default_audio_dir(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SttConfig {
    /// The configured API key, if one is set and non-empty
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint must be a valid URL")
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_audio_size() -> u64 {
    DEFAULT_MAX_AUDIO_SIZE
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from(DEFAULT_AUDIO_DIR)
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid duration '{raw}': {e}")))
}
