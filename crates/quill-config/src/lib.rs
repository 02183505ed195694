#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod server;
pub mod stt;
pub mod telemetry;

use serde::Deserialize;

pub use server::*;
pub use stt::*;
pub use telemetry::*;

/// Top-level Quill configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech-to-text relay configuration
    #[serde(default)]
    pub stt: SttConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
