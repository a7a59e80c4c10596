//! Logging setup for binaries embedding the engine.
//!
//! The library itself only emits `tracing` events. Hosts that want them on
//! stderr call [`init`] once at startup; `RUST_LOG` takes precedence over
//! the default level.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";
const VERBOSE_DIRECTIVE: &str = "trackcast=debug,info";

/// Build the filter: `RUST_LOG` if set, else `info` (or `debug` for trackcast when verbose).
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install a stderr fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
