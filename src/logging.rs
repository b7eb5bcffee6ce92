//! Tracing subscriber setup for step runners

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::Config;
use crate::{Error, Result};

/// Filter directives: `RUST_LOG` when set, the configured level otherwise
pub fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install a global fmt subscriber writing through the test harness
///
/// Fails when a global subscriber is already installed.
pub fn init(config: &Config) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter(config))
        .with_test_writer()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::configuration(format!("Setting default subscriber failed: {}", e)))?;

    info!("Drupal-Steps v{}", crate::VERSION);
    Ok(())
}
