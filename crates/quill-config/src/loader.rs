use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable expansion, parsing, or
    /// validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the relay settings are unusable or the health
    /// path is malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_stt_config()?;
        self.validate_health_config()?;
        Ok(())
    }

    fn validate_stt_config(&self) -> anyhow::Result<()> {
        let stt = &self.stt;

        if stt.max_audio_size == 0 {
            anyhow::bail!("stt.max_audio_size must be greater than 0");
        }

        if stt.timeout.is_zero() {
            anyhow::bail!("stt.timeout must be greater than 0");
        }

        if stt.audio_dir.as_os_str().is_empty() {
            anyhow::bail!("stt.audio_dir must not be empty");
        }

        if !matches!(stt.endpoint.scheme(), "http" | "https") {
            anyhow::bail!("stt.endpoint must be an http or https URL, got '{}'", stt.endpoint);
        }

        Ok(())
    }

    fn validate_health_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }
}
