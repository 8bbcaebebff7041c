//! MergeService: orchestrates sources, applies merge policy, deserializes to TaskfsConfig.

use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::TaskfsConfig;
use crate::error::ApiError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from standard sources plus an optional explicit file.
    /// Precedence: defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(explicit: Option<&Path>) -> Result<TaskfsConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = match explicit {
            Some(path) => explicit_file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        let config: TaskfsConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
