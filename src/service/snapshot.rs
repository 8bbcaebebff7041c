//! File-backed service
//!
//! Reads a task snapshot from disk on every fetch, so writing `refresh` to the
//! service's control file picks up edits to the snapshot. The format follows the
//! file extension: `.json`, `.yaml`/`.yml`, or `.toml`.

use super::{Service, Task, TaskRecord};
use crate::error::BoxError;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Ok(SnapshotFormat::Yaml),
            Some("toml") => Ok(SnapshotFormat::Toml),
            _ => Err(anyhow!(
                "unsupported snapshot format for {} (expected .json, .yaml, .yml or .toml)",
                path.display()
            )),
        }
    }

    fn parse(self, content: &str) -> anyhow::Result<SnapshotFile> {
        let snapshot: SnapshotFile = match self {
            SnapshotFormat::Json => serde_json::from_str(content)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
            SnapshotFormat::Toml => toml::from_str(content)?,
        };
        Ok(snapshot)
    }
}

/// Service that serves the tasks recorded in a snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotService {
    name: String,
    path: PathBuf,
}

impl SnapshotService {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<SnapshotFile> {
        let format = SnapshotFormat::from_path(&self.path)?;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading snapshot {}", self.path.display()))?;
        format
            .parse(&content)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))
    }
}

#[async_trait]
impl Service for SnapshotService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<Arc<dyn Task>>, BoxError> {
        let snapshot = self.load().await?;
        debug!(
            service = %self.name,
            path = %self.path.display(),
            count = snapshot.tasks.len(),
            "Loaded snapshot"
        );
        Ok(snapshot
            .tasks
            .into_iter()
            .map(|task| Arc::new(task) as Arc<dyn Task>)
            .collect())
    }
}
