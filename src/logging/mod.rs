use anyhow::Result;
use tracing::Level;

/// Set up logging, debug mode lowers the threshold to DEBUG
pub fn setup_logger(debug: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(get_log_level(debug))
        .with_target(debug)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    Ok(())
}

/// Get the appropriate log level for the debug flag
pub fn get_log_level(debug: bool) -> Level {
    if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}
