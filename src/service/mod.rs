//! Tracker Services
//!
//! The boundary between the tree and tracker adapters. An adapter is a named
//! [`Service`] that returns a complete snapshot of its [`Task`]s; pagination,
//! authentication, and transport belong to the adapter.

pub mod memory;
pub mod snapshot;

use crate::error::BoxError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use memory::MemoryService;
pub use snapshot::SnapshotService;

/// A single issue or ticket from a remote tracker
pub trait Task: Send + Sync {
    /// Name of the task's directory; unique within its service
    fn key(&self) -> &str;
    fn subject(&self) -> &str;
    fn message(&self) -> &str;
    fn permalink(&self) -> &str;
    fn creation(&self) -> DateTime<Utc>;
    fn last_mod(&self) -> DateTime<Utc>;
}

/// A named tracker adapter
#[async_trait]
pub trait Service: Send + Sync {
    /// Stable identifier, used as the service directory's name
    fn name(&self) -> &str;

    /// Fetch every task.
    ///
    /// Must return the complete list or an error, never a silently truncated list.
    async fn list(&self) -> Result<Vec<Arc<dyn Task>>, BoxError>;
}

/// Plain owned task, used by the bundled services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub key: String,
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub permalink: String,
    pub created: DateTime<Utc>,
    /// Defaults to `created` when absent
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(key: impl Into<String>, subject: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            subject: subject.into(),
            message: String::new(),
            permalink: String::new(),
            created,
            updated: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_permalink(mut self, permalink: impl Into<String>) -> Self {
        self.permalink = permalink.into();
        self
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }
}

impl Task for TaskRecord {
    fn key(&self) -> &str {
        &self.key
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn message(&self) -> &str {
        &self.message
    }

    fn permalink(&self) -> &str {
        &self.permalink
    }

    fn creation(&self) -> DateTime<Utc> {
        self.created
    }

    fn last_mod(&self) -> DateTime<Utc> {
        self.updated.unwrap_or(self.created)
    }
}
