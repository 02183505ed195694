use std::{net::SocketAddr, time::Duration};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: Option<CorsConfig>,
}

/// Health check endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_path(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    "/health".to_string()
}

/// CORS configuration
///
/// The chat frontend uploads recordings from another origin, so deployments
/// usually set `origins` to the frontend URL.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard "*" or explicit list of values
///
/// A single comma-separated string is also accepted, which is the shape an
/// `ALLOWED_ORIGINS`-style environment variable usually has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrArray {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

impl AnyOrArray {
    fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut list = Vec::new();

        for value in values {
            let value = value.trim();
            if value == "*" {
                return Self::Any;
            }
            if !value.is_empty() {
                list.push(value.to_owned());
            }
        }

        Self::List(list)
    }
}

impl<'de> Deserialize<'de> for AnyOrArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(value) => Self::from_values(value.split(',').map(str::to_owned)),
            Raw::Many(values) => Self::from_values(values),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        origins: AnyOrArray,
    }

    fn parse(raw: &str) -> AnyOrArray {
        toml::from_str::<Wrapper>(raw).unwrap().origins
    }

    #[test]
    fn wildcard_string() {
        assert_eq!(parse("origins = \"*\""), AnyOrArray::Any);
    }

    #[test]
    fn comma_separated_string() {
        assert_eq!(
            parse("origins = \"http://localhost:3000, https://chat.example.com\""),
            AnyOrArray::List(vec![
                "http://localhost:3000".to_owned(),
                "https://chat.example.com".to_owned()
            ])
        );
    }

    #[test]
    fn wildcard_inside_list_wins() {
        assert_eq!(parse("origins = [\"http://a.example\", \"*\"]"), AnyOrArray::Any);
    }

    #[test]
    fn health_defaults() {
        let health = HealthConfig::default();
        assert!(health.enabled);
        assert_eq!(health.path, "/health");
    }
}
