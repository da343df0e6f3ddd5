use kma_cli::cli;
use kma_cli::errors::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = tokio::runtime::Runtime::new().map_err(|e| AppError::IoError(e.to_string()))?;
    rt.block_on(cli::cli())?;
    Ok(())
}
