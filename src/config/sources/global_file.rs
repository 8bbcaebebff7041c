//! Global config file: $XDG_CONFIG_HOME/taskfs/config.toml (optional)

use config::builder::DefaultState;
use config::{ConfigBuilder, File};

use crate::config::xdg;
use crate::error::ApiError;

/// Add the global config file to builder when a config home can be determined.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ApiError> {
    match xdg::global_config_path() {
        Ok(path) => Ok(builder.add_source(File::from(path).required(false))),
        Err(e) => {
            tracing::debug!("Skipping global config file: {}", e);
            Ok(builder)
        }
    }
}
