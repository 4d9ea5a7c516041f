use tracing_subscriber::EnvFilter;

/// JSON lines on stdout for CloudWatch; `RUST_LOG` overrides the `info`
/// default. CloudWatch stamps each line, so the subscriber does not.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();
}
