//! Config file named on the command line; must exist.

use config::builder::DefaultState;
use config::{ConfigBuilder, File};
use std::path::Path;

use crate::error::ApiError;

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ApiError> {
    if !path.exists() {
        return Err(ApiError::ConfigError(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).required(true)))
}
