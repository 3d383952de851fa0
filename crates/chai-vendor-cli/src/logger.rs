//! Tracing subscriber setup for the chai-vendor CLI.
//!
//! `--verbose` shows every plugin selection decision, `--quiet` only errors.
//! Without either flag `RUST_LOG` is honored, falling back to info level for
//! the chai-vendor crates.
//!
//! ```rust,no_run
//! use chai_vendor_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("vendoring chai");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "chai_vendor=debug,chai_vendor_cli=debug";
const QUIET_FILTER: &str = "chai_vendor=error,chai_vendor_cli=error";
const DEFAULT_FILTER: &str = "chai_vendor=info,chai_vendor_cli=info";

/// Picks the filter directives for the given flags.
pub fn filter_directives(verbose: bool, quiet: bool) -> Option<&'static str> {
    if verbose {
        Some(VERBOSE_FILTER)
    } else if quiet {
        Some(QUIET_FILTER)
    } else {
        None
    }
}

/// Initialize the global tracing subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match filter_directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };

    init_logger_with_filter(filter, no_color);
}

/// Initialize the subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
