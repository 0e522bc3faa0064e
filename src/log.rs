// src/log.rs
// Diagnostics go to stderr through `tracing`; reports own stdout.
use tracing_subscriber::{fmt, EnvFilter};

pub use tracing;

/// Env var holding an `EnvFilter` directive (e.g. `peloton_import=debug`).
pub const LOG_ENV: &str = "PELOTON_LOG";

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
///
/// `verbose` raises the default level from `info` to `debug` when `PELOTON_LOG` is unset.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        $crate::log::tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        $crate::log::tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::tracing::error!($($arg)*)
    };
}
