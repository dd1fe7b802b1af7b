//! Subscriber setup for the gateway's tracing output.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

static INIT: Once = Once::new();

/// Builds the filter: `RUST_LOG` when set, otherwise the configured level.
///
/// # Errors
///
/// Returns `Error::Config` if the configured level is not a valid directive.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| Error::Config(format!("invalid log level {:?}: {e}", config.level))),
    }
}

/// Installs the global subscriber.
///
/// Only the first call installs anything. Later calls are no-ops, including
/// when a subscriber was installed elsewhere.
///
/// # Errors
///
/// Returns `Error::Config` if the configured level is invalid.
///
/// # Example
///
/// ```
/// use cat_gateway::config::LoggingConfig;
///
/// cat_gateway::logging::init(&LoggingConfig::default()).unwrap();
/// tracing::info!("gateway starting");
/// ```
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = filter(config)?;
    let json = config.json;

    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        let installed = if json {
            registry.with(fmt::layer().json()).try_init()
        } else {
            registry.with(fmt::layer()).try_init()
        };
        if installed.is_err() {
            tracing::debug!("global subscriber already set");
        }
    });
    Ok(())
}
