//! Gateway configuration.
//!
//! Sources are layered with `figment`, later ones winning:
//!
//! 1. built-in defaults (logging only);
//! 2. an optional YAML file;
//! 3. the bare `AUTH_URL` environment variable;
//! 4. `CAT_GATEWAY_*` environment variables, nested with `__`
//!    (`CAT_GATEWAY_LOGGING__LEVEL=debug`).
//!
//! `auth_url` has no default. Loading fails if no source provides it.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Runtime configuration of the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the identity service
    pub auth_url: Url,
    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl GatewayConfig {
    /// Creates a configuration pointing at `auth_url` with default logging.
    pub fn new(auth_url: Url) -> Self {
        Self {
            auth_url,
            logging: LoggingConfig::default(),
        }
    }

    /// Returns the layered provider, optionally including a YAML file.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment =
            Figment::new().merge(Serialized::default("logging", LoggingConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::raw().only(&["AUTH_URL"]))
            .merge(Env::prefixed("CAT_GATEWAY_").split("__"))
    }

    /// Loads configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `auth_url` is missing or malformed.
    pub fn load() -> Result<Self> {
        Self::extract(Self::figment(None))
    }

    /// Loads configuration from a YAML file overlaid with the environment.
    ///
    /// A missing file is skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the sources cannot be merged into a valid
    /// configuration.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(Self::figment(Some(path.as_ref())))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        if config.auth_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "auth_url {} cannot be a base URL",
                config.auth_url
            )));
        }
        Ok(config)
    }
}
