//! Tracing bootstrap.
//!
//! `RUST_LOG` wins when set; otherwise the configured `telemetry.filter`
//! applies. Output is human-readable or JSON lines per `telemetry.log_format`.

use anyhow::anyhow;
use libris_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    }
    .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::debug!(
        target: "libris-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

/// Filter from `RUST_LOG`, falling back to the configured directive.
pub fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|err| anyhow!("invalid log filter '{}': {err}", settings.filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used() {
        let settings = TelemetrySettings {
            filter: "libris=debug,tower_http=warn".to_string(),
            ..TelemetrySettings::default()
        };
        assert!(build_filter(&settings).is_ok());
    }

    #[test]
    fn second_init_reports_failure() {
        let settings = TelemetrySettings::default();
        let _ = init(&settings);
        assert!(init(&settings).is_err());
    }
}
