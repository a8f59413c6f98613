//! Diagnostic logging setup.
//!
//! Logs go to stderr; stdout carries only the preview and run summary.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `ads_viz=info`, or `ads_viz=debug`
/// with `verbose`. Calling this twice is harmless.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "ads_viz=debug" } else { "ads_viz=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
