//! Logging configuration
//!
//! Logs go to stderr so they never interleave with REPL output on stdout.
//! Set `DEBUG_LOGGING=1` to enable debug output for this crate; `RUST_LOG`
//! overrides both.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter used when `RUST_LOG` is not set
fn default_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        // DEBUG_LOGGING=1: debug for this crate, warn for dependencies
        "warn,countdown=debug"
    } else {
        "warn"
    }
}

/// Initialize stderr logging. Call once, before any timer is created.
pub fn init() {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_logging)));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(debug_logging, "countdown logging initialized");
}
