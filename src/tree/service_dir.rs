//! Per-service directory
//!
//! Lists one [`TaskDir`] per task plus a `ctl` control file. The listing is fetched
//! from the service on first use and cached until a `refresh` is written to `ctl`.
//!
//! Cache lifecycle: **empty** until a fetch succeeds, then **populated** until
//! refreshed. A failed or cancelled fetch leaves the cache empty, so the next
//! listing retries. The cache mutex is held across the fetch; concurrent listings
//! of a cold directory wait for the one fetch in flight rather than starting their
//! own.
//!
//! A refresh never takes the cache mutex. It bumps the state's generation, and a
//! cached listing is only served while its generation is current, so a refresh
//! issued mid-fetch returns at once and the next listing fetches again.

use super::ctl::{Ctl, CTL};
use super::node::{FileInfo, Node};
use super::task_dir::TaskDir;
use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::service::{Service, Task};
use crate::types::NodeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Listing fetched under one generation
struct Cached {
    generation: u64,
    entries: Vec<Arc<dyn Node>>,
}

/// Cache state shared by every [`ServiceDir`] built for one service
pub(crate) struct ServiceState {
    id: NodeId,
    service: Arc<dyn Service>,
    generation: AtomicU64,
    cache: Mutex<Option<Cached>>,
}

impl ServiceState {
    pub(crate) fn new(service: Arc<dyn Service>) -> Self {
        Self {
            id: NodeId::next(),
            service,
            generation: AtomicU64::new(0),
            cache: Mutex::new(None),
        }
    }

    pub(crate) fn name(&self) -> &str {
        self.service.name()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate the cached listing without waiting for a fetch in flight.
    pub(crate) fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut cache) = self.cache.try_lock() {
            cache.take();
        }
        debug!(service = %self.name(), "Invalidated cached listing");
    }

    fn current<'a>(&self, cache: &'a Option<Cached>) -> Option<&'a Vec<Arc<dyn Node>>> {
        let generation = self.generation();
        cache
            .as_ref()
            .filter(|cached| cached.generation == generation)
            .map(|cached| &cached.entries)
    }
}

pub struct ServiceDir {
    info: FileInfo,
    state: Arc<ServiceState>,
}

impl ServiceDir {
    /// Standalone directory with its own cache
    pub fn new(service: Arc<dyn Service>) -> Self {
        let now = Utc::now();
        Self::with_state(Arc::new(ServiceState::new(service)), now, now)
    }

    pub(crate) fn with_state(
        state: Arc<ServiceState>,
        creation: DateTime<Utc>,
        last_mod: DateTime<Utc>,
    ) -> Self {
        Self {
            info: FileInfo::dir(state.name(), creation, last_mod),
            state,
        }
    }

    pub fn service(&self) -> &Arc<dyn Service> {
        &self.state.service
    }

    /// Whether a listing is currently cached
    pub async fn is_populated(&self) -> bool {
        let cache = self.state.cache.lock().await;
        self.state.current(&cache).is_some()
    }

    async fn fetch(&self, cancel: &Cancellation) -> Result<Vec<Arc<dyn Task>>, FsError> {
        let name = self.state.name();
        info!(service = %name, "Fetching task list");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(service = %name, "Task list fetch cancelled");
                Err(FsError::Cancelled { service: name.to_string() })
            }
            result = self.state.service.list() => result.map_err(|source| {
                warn!(service = %name, error = %source, "Task list fetch failed");
                FsError::Upstream { service: name.to_string(), source }
            }),
        }
    }

    fn build_entries(&self, tasks: Vec<Arc<dyn Task>>) -> Vec<Arc<dyn Node>> {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut entries: Vec<Arc<dyn Node>> = Vec::with_capacity(tasks.len() + 1);
        for task in tasks {
            let key = task.key();
            if !is_valid_key(key) || !seen.insert(key.to_string()) {
                warn!(service = %self.state.name(), key = %key, "Skipping task with unusable key");
                continue;
            }
            entries.push(Arc::new(TaskDir::new(task)));
        }
        entries.push(Arc::new(Ctl::new(Arc::downgrade(&self.state))));
        entries
    }
}

/// Keys become directory names next to `ctl`.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key != CTL && key != "." && key != ".." && !key.contains('/')
}

#[async_trait]
impl Node for ServiceDir {
    fn id(&self) -> NodeId {
        self.state.id
    }

    fn stat(&self) -> &FileInfo {
        &self.info
    }

    async fn read_dir(&self, cancel: &Cancellation) -> Result<Vec<Arc<dyn Node>>, FsError> {
        let mut cache = match self.state.cache.try_lock() {
            Ok(guard) => guard,
            // Another listing is fetching.
            Err(_) => tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FsError::Cancelled { service: self.state.name().to_string() });
                }
                guard = self.state.cache.lock() => guard,
            },
        };

        if let Some(entries) = self.state.current(&cache) {
            debug!(service = %self.state.name(), "Serving cached listing");
            return Ok(entries.clone());
        }

        let generation = self.state.generation();
        let tasks = self.fetch(cancel).await?;
        let entries = self.build_entries(tasks);
        info!(
            service = %self.state.name(),
            tasks = entries.len() - 1,
            "Cached task listing"
        );
        if generation != self.state.generation() {
            debug!(service = %self.state.name(), "Refreshed during fetch; next listing refetches");
        }
        *cache = Some(Cached {
            generation,
            entries: entries.clone(),
        });
        Ok(entries)
    }

    fn read_file(&self) -> Result<Vec<u8>, FsError> {
        Err(FsError::protocol("read_file", &self.info.name))
    }

    async fn refresh(&self) {
        self.state.clear();
    }
}
