//! Tracing subscriber setup for the `layout` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber once per process.
///
/// `RUST_LOG` takes precedence when set. Otherwise warnings (overwritten
/// duplicates, skipped modules) are shown, and `verbose` adds one line per
/// processed module.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let default = if verbose { "info" } else { "warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        // Ignored when a global subscriber is already set.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .try_init();
    });
}
