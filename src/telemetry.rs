use tracing_subscriber::{EnvFilter, fmt};

/// Initialize tracing with `RUST_LOG` support, default `info`.
///
/// Output goes to stdout without ANSI colors or targets so the Actions log
/// stays readable; workflow commands are written to the same stream.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|err| anyhow::anyhow!("tracing already initialized: {err}"))?;

    Ok(())
}
