//! Tracing setup.
//!
//! The subscriber is installed before the config file is read so that load
//! failures are reported. The config's `log_level` is applied afterwards
//! through a reload handle, unless `RUST_LOG` or `--log-level` already chose.

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub const DEFAULT_LEVEL: &str = "info";

/// Handle for swapping the active filter.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter directive fixed before the config is read.
///
/// Priority: `RUST_LOG` > `--log-level`. `None` leaves it to the config file.
pub fn explicit_directive(rust_log: Option<String>, flag: Option<&str>) -> Option<String> {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .or_else(|| flag.map(str::to_string))
}

fn parse_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Build the subscriber writing to `writer`, filtered by `directive`.
pub fn build_subscriber<W>(
    directive: &str,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(parse_filter(directive));
    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

/// Switch to the config file's level.
pub fn apply_config_level(handle: &FilterHandle, level: &str) {
    if EnvFilter::try_new(level).is_err() {
        tracing::warn!(level, "Invalid log level in config, keeping {}", DEFAULT_LEVEL);
        return;
    }
    match handle.reload(parse_filter(level)) {
        Ok(()) => tracing::debug!(level, "Log level taken from config"),
        Err(e) => tracing::warn!(error = %e, "Failed to apply config log level"),
    }
}
