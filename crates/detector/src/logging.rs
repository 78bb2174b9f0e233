//! Tracing subscriber setup.

use std::sync::Once;

use tickwatch_types::LoggingConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Builds the level filter: `RUST_LOG` when set, otherwise `config.level`,
/// falling back to `info` for an unknown level.
#[must_use]
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
        EnvFilter::default().add_directive(level.into())
    })
}

/// Installs the global tracing subscriber once; later calls are no-ops.
///
/// Logs go to stderr so stdout stays free for command output.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config);
        let installed = if config.json {
            tracing_subscriber::fmt()
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init()
        } else {
            tracing_subscriber::fmt()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .try_init()
        };

        if installed.is_ok() {
            tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
        }
    });
}
