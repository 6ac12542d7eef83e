//! Drowsiness Monitor CLI
//!
//! Replays recorded detection traces through the DMS monitoring loop and
//! renders the resulting status stream.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub mod display;
pub mod settings;
pub mod trace;

pub use display::{ConsoleSink, OutputFormat, StatusReport};
pub use settings::{apply_overrides, load_config, Preset};
pub use trace::{channel, parse_line, produce, ChannelSource};

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Trace line {line}: {message}")]
    Trace { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Dms(#[from] dms::DmsError),

    #[error("Failed to install logger: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize logging. Logs go to stderr so stdout only carries status lines.
pub fn init_logging(level: Level, json: bool) -> Result<(), CliError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    Ok(())
}
