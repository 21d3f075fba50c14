//! Tracing/logging bootstrap for BOOKSWAP.

use tracing_subscriber::EnvFilter;

use bookswap_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the tracing pipeline according to settings.
///
/// Safe to call more than once; later calls are no-ops (useful in tests).
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(format = ?settings.log_format, "telemetry initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let settings = TelemetrySettings::default();
        init(&settings);
        init(&settings);
    }
}
