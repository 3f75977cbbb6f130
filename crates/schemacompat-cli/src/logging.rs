//! Logging setup for the CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "schema_compat=info,schemacompat=info";
const VERBOSE_LOG_FILTER: &str = "schema_compat=debug,schemacompat=debug";

/// Initialize tracing on stderr. `RUST_LOG` overrides both presets.
pub fn init_logging(verbose: bool) {
    let preset = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(preset));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}
