use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Resolves the effective filter directive: `RUST_LOG` wins over the
/// configured value, and an empty configured value falls back to `info`.
pub fn resolve_log_filter(configured: &str, env_override: Option<&str>) -> String {
    if let Some(raw) = env_override {
        if !raw.trim().is_empty() {
            return raw.trim().to_string();
        }
    }
    if configured.trim().is_empty() {
        return DEFAULT_LOG_FILTER.to_string();
    }
    configured.trim().to_string()
}

/// Installs a stderr `fmt` subscriber. Calling it twice is harmless; the
/// second install is ignored.
pub fn init_logging(configured_filter: &str) {
    let env_override = std::env::var("RUST_LOG").ok();
    let directive = resolve_log_filter(configured_filter, env_override.as_deref());
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
