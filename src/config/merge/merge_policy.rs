//! Builder seeded with the defaults every other source overrides.

use crate::error::ApiError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};

/// Create a config builder carrying the built-in defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ApiError> {
    let builder = Config::builder()
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "warn")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.color", true)?;
    Ok(builder)
}
