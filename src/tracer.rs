// src/tracer.rs
// =============================================================================
// Logging setup for the `tracing` macros used across the crate.
// =============================================================================

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Logs go to stderr so they never mix with the progress lines or the JSON
// report on stdout. RUST_LOG overrides the -v count.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,site_crawler={}", default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
