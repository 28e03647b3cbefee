//! Tracing setup for the binary.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "welfare_finder=warn";

/// Filter directive for a `-v` count. `RUST_LOG` wins over all of these.
pub fn filter_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => DEFAULT_LOG_FILTER,
        1 => "welfare_finder=debug",
        _ => "welfare_finder=trace,reqwest=debug",
    }
}

/// Installs a stderr subscriber so log lines never mix with the page on
/// stdout. Safe to call more than once; later calls are no-ops.
pub fn init_logging(verbose: u8, ansi: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbose)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_target(verbose > 0),
        )
        .with(filter)
        .try_init();
}
