//! Log output setup.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a formatting subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG`, falling back to `default_filter`.
/// Calling this more than once is harmless: only the first call installs a
/// subscriber.
pub fn init_tracing(default_filter: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .finish();

    if subscriber.try_init().is_ok() {
        tracing::debug!("logging initialized");
    }
}
