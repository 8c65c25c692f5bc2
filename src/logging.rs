use tracing_subscriber::EnvFilter;

/// Initializes structured logging to standard error. The filter is taken from
/// `RUST_LOG` and defaults to `info`.
pub fn init_logging(
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
