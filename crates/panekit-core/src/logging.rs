#![forbid(unsafe_code)]

//! Structured log output for hosts without a subscriber of their own.
//!
//! The engine only emits `tracing` events; it never installs a subscriber.
//! Hosts that want JSON lines on stderr can call [`init_json_logging`] once
//! at startup. `RUST_LOG` takes precedence over the default filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::prelude::*;

/// Build the JSON subscriber without installing it.
///
/// Useful for scoping output with `tracing::subscriber::with_default`.
pub fn json_subscriber(default_filter: &str) -> impl tracing::Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr),
    )
}

/// Install the JSON subscriber as the global default.
///
/// Fails if another global subscriber is already installed.
pub fn init_json_logging(default_filter: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init()
}
