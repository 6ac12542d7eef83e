//! Layered configuration loading
//!
//! Defaults, then an optional config file, then `DMS__*` environment
//! variables (e.g. `DMS__CLOSED_DURATION_THRESHOLD_MS=1500`), then the
//! command-line threshold flags via [`apply_overrides`].

use clap::ValueEnum;
use config::{Config, Environment, File};
use dms::DmsConfig;
use std::path::Path;
use tracing::debug;

use crate::CliError;

/// Threshold presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Default,
    Strict,
    Lenient,
}

impl Preset {
    pub fn config(self) -> DmsConfig {
        match self {
            Preset::Default => DmsConfig::default(),
            Preset::Strict => DmsConfig::strict(),
            Preset::Lenient => DmsConfig::lenient(),
        }
    }
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<DmsConfig, CliError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        debug!("Loading config file {}", path.display());
        builder = builder.add_source(File::from(path));
    }

    builder = builder.add_source(
        Environment::with_prefix("DMS")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("closed_eye_labels")
            .try_parsing(true),
    );

    let config: DmsConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Apply command-line threshold flags on top of a loaded config.
///
/// A preset replaces the threshold from file and environment; an explicit
/// `threshold_ms` wins over both.
pub fn apply_overrides(
    config: &mut DmsConfig,
    preset: Option<Preset>,
    threshold_ms: Option<u64>,
) -> Result<(), CliError> {
    if let Some(preset) = preset {
        config.closed_duration_threshold_ms = preset.config().closed_duration_threshold_ms;
    }
    if let Some(ms) = threshold_ms {
        config.closed_duration_threshold_ms = ms;
    }
    config.validate()?;
    Ok(())
}
