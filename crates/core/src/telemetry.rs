use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing/logging with env filter support.
///
/// Events go to stderr; stdout is reserved for the report.
pub fn init_tracing() -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| color_eyre::eyre::eyre!("tracing already initialized: {err}"))?;

    Ok(())
}
