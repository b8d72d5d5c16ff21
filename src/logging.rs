//! Structured logging setup.
//!
//! Logs go to **stderr**; stdout belongs to the host process that drives the
//! provider. Filtering follows `RUST_LOG`, for example
//! `RUST_LOG=ec_deployment_provider=debug` to see every built request and
//! plan poll.
//!
//! ```ignore
//! use ec_deployment_provider::{init_logging_with_default, logging::default_directive, ProviderConfig};
//!
//! let config = ProviderConfig::from_value(block)?;
//! init_logging_with_default(default_directive(config.verbose));
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::registry().with(filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(default_directive(false));
}

/// Like [`init_logging`], with a different level when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Install the global subscriber unless one is already set.
///
/// Returns `false` when another subscriber was installed first.
pub fn try_init_logging() -> bool {
    subscriber(default_directive(false)).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so only the
    // filters are tested here.

    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
    }

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
        assert!(EnvFilter::try_new("ec_deployment_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,ec_deployment_provider::resource=trace").is_ok());
    }
}
