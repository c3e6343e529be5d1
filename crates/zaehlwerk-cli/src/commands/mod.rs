//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;

use zaehlwerk_core::ExtractionConfig;

/// Load the extraction configuration, falling back to defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<ExtractionConfig> {
    match config_path {
        Some(path) => Ok(ExtractionConfig::from_file(std::path::Path::new(path))?),
        None => Ok(ExtractionConfig::default()),
    }
}
