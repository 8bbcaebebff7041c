//! Environment variable source: TASKFS_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

use crate::error::ApiError;

/// Add environment variable overlay to builder.
/// Uses TASKFS prefix and __ as separator for nested keys, e.g. `TASKFS__LOGGING__LEVEL`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ApiError> {
    let builder = builder.add_source(
        Environment::with_prefix("TASKFS")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
