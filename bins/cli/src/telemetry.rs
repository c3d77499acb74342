//! Tracing subscriber setup for the CLI.

use codescope_config::{LogFormat, ValidatedClientConfig};
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Nothing is installed
/// when progress output is suppressed.
pub fn init_tracing(config: &ValidatedClientConfig, no_progress: bool) {
    if no_progress {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be set (tests); keep the existing one.
    let _ = match config.log.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
