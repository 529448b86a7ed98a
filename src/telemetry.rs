use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "SERP_FORECAST_LOG";

/// Install the global fmt subscriber, writing to stderr.
///
/// Reads the filter from [`LOG_ENV`] and falls back to `info`. Calling this
/// twice is harmless; the second call leaves the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
