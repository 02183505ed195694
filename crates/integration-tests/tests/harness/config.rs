//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use quill_config::{Config, HealthConfig, ServerConfig, SttConfig};
use secrecy::SecretString;
use url::Url;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal config staging uploads under `audio_dir`, with no API key
    pub fn new(audio_dir: &Path) -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    cors: None,
                },
                stt: SttConfig {
                    audio_dir: audio_dir.to_path_buf(),
                    ..SttConfig::default()
                },
                telemetry: None,
            },
        }
    }

    /// Forward transcriptions to `endpoint`
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.config.stt.endpoint = Url::parse(endpoint).expect("valid endpoint url");
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.config.stt.api_key = Some(SecretString::from(key.to_owned()));
        self
    }

    pub fn with_max_audio_size(mut self, bytes: u64) -> Self {
        self.config.stt.max_audio_size = bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.stt.timeout = timeout;
        self
    }

    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
