//! Configuration
//!
//! Which services to mount into the tree and how to log. Loaded through the
//! `config` crate from defaults, the global config file, an optional explicit file,
//! and `TASKFS__*` environment variables, in increasing precedence.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::error::{ApiError, FsError};
use crate::logging::LoggingConfig;
use crate::service::SnapshotService;
use crate::tree::Root;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// One snapshot-backed service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory name under the root
    pub name: String,
    /// Snapshot file (.json, .yaml, .yml or .toml)
    pub path: PathBuf,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskfsConfig {
    #[serde(default)]
    pub services: Vec<ServiceConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TaskfsConfig {
    /// Check service names before any are registered.
    pub fn validate(&self) -> Result<(), ApiError> {
        for service in &self.services {
            let name = service.name.as_str();
            if name.is_empty() || name == "." || name == ".." || name.contains('/') {
                return Err(ApiError::ConfigError(format!(
                    "Invalid service name: {:?}",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Build a root with every configured service registered.
    pub fn build_root(&self) -> Result<Root, ApiError> {
        self.validate()?;
        let mut root = Root::new();
        for service in &self.services {
            root.create_service(Arc::new(SnapshotService::new(
                service.name.clone(),
                service.path.clone(),
            )))
            .map_err(|e| match e {
                FsError::DuplicateService(name) => {
                    ApiError::ConfigError(format!("Service {} is configured twice", name))
                }
                other => ApiError::Fs(other),
            })?;
        }
        Ok(root)
    }
}
