//! Tracing subscriber setup.
//!
//! Events go to the browser console through `tracing-wasm` on wasm32 and to
//! stderr through the `tracing-subscriber` fmt layer elsewhere. The
//! subscriber is installed once per process; later calls only swap the
//! level filter.

use std::sync::OnceLock;

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Registry, reload};

static FILTER: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Install the subscriber (first call) and set the maximum level.
///
/// # Errors
///
/// Returns a readable message for an unknown level, or when another global
/// subscriber was installed first.
pub fn init_logging(level: &str) -> Result<(), String> {
    let filter = parse_level(level)?;

    if let Some(handle) = FILTER.get() {
        return handle
            .reload(filter)
            .map_err(|err| format!("failed to change log level: {err}"));
    }

    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = Registry::default().with(filter).with(output_layer());
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| format!("failed to install subscriber: {err}"))?;
    let _ = FILTER.set(handle);
    Ok(())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

#[cfg(target_arch = "wasm32")]
fn output_layer<S>() -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default())
}

#[cfg(not(target_arch = "wasm32"))]
fn output_layer<S>() -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        "debug" => Ok(LevelFilter::DEBUG),
        "trace" => Ok(LevelFilter::TRACE),
        other => Err(format!(
            "unsupported log level `{other}`; expected off|error|warn|info|debug|trace"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" Warning "), Ok(LevelFilter::WARN));
        assert_eq!(parse_level("TRACE"), Ok(LevelFilter::TRACE));
        assert!(parse_level("loud").unwrap_err().contains("loud"));
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_logging("info").is_ok());
        assert!(FILTER.get().is_some());

        // Second call reloads the filter instead of reinstalling
        assert!(init_logging("debug").is_ok());
        assert!(init_logging("nope").is_err());
        assert!(init_logging("warn").is_ok());
    }
}
