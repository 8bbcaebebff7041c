//! Root directory: the registry of services.

use super::node::{FileInfo, Node};
use super::service_dir::{ServiceDir, ServiceState};
use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::service::Service;
use crate::types::NodeId;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Root of the tree
///
/// Services are registered with `&mut self` before the root is shared, so the
/// registered set cannot change while the tree is served. Each service's cache
/// lives here; the service directories handed out by `read_dir` are fresh nodes
/// stamped with the current time that all share it.
pub struct Root {
    id: NodeId,
    info: FileInfo,
    services: BTreeMap<String, Arc<ServiceState>>,
}

impl Root {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::next(),
            info: FileInfo::dir("", now, now),
            services: BTreeMap::new(),
        }
    }

    /// Register a service under its name.
    ///
    /// A second service with the same name is rejected.
    pub fn create_service(&mut self, service: Arc<dyn Service>) -> Result<(), FsError> {
        let name = service.name().to_string();
        if self.services.contains_key(&name) {
            return Err(FsError::DuplicateService(name));
        }
        info!(service = %name, "Registered service");
        self.services
            .insert(name, Arc::new(ServiceState::new(service)));
        Ok(())
    }

    /// Registered service names in listing order
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Build the directory for one service
    pub fn service_dir(&self, name: &str) -> Option<ServiceDir> {
        let now = Utc::now();
        self.services
            .get(name)
            .map(|state| ServiceDir::with_state(Arc::clone(state), now, now))
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Node for Root {
    fn id(&self) -> NodeId {
        self.id
    }

    fn stat(&self) -> &FileInfo {
        &self.info
    }

    async fn read_dir(&self, _cancel: &Cancellation) -> Result<Vec<Arc<dyn Node>>, FsError> {
        let now = Utc::now();
        Ok(self
            .services
            .values()
            .map(|state| {
                Arc::new(ServiceDir::with_state(Arc::clone(state), now, now)) as Arc<dyn Node>
            })
            .collect())
    }

    fn read_file(&self) -> Result<Vec<u8>, FsError> {
        Err(FsError::protocol("read_file", "/"))
    }

    async fn refresh(&self) {}
}
