use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Build the event filter: `RUST_LOG` when set, otherwise `fitdata=<level>`.
pub fn filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level: LevelFilter = level
        .parse()
        .map_err(|e| Error::InvalidData(format!("invalid log level {level:?}: {e}")))?;
    EnvFilter::try_new(format!("fitdata={level}"))
        .map_err(|e| Error::InvalidData(format!("invalid log filter: {e}")))
}

/// Initialize logging to stderr.
///
/// Stdout stays reserved for command output.
pub fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .try_init()
        .map_err(|e| Error::Io(format!("failed to install log subscriber: {e}")))?;

    tracing::debug!(level, "logging initialized");
    Ok(())
}
