//! In-process service whose task list can be swapped at runtime.

use super::{Service, Task, TaskRecord};
use crate::error::BoxError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Service backed by an in-memory task list
///
/// Counts calls to [`Service::list`], can simulate upstream latency, and can be
/// told to fail its next fetch. Embedding hosts use it to publish tasks they
/// already hold; tests use it as a controllable tracker.
pub struct MemoryService {
    name: String,
    tasks: RwLock<Vec<Arc<dyn Task>>>,
    fetches: AtomicUsize,
    latency: RwLock<Option<Duration>>,
    fail_next: RwLock<Option<String>>,
}

impl MemoryService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: RwLock::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            latency: RwLock::new(None),
            fail_next: RwLock::new(None),
        }
    }

    /// Replace the published task list
    pub fn set_tasks<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = TaskRecord>,
    {
        *self.tasks.write() = tasks
            .into_iter()
            .map(|task| Arc::new(task) as Arc<dyn Task>)
            .collect();
    }

    /// Replace the published task list with arbitrary task implementations
    pub fn set_dyn_tasks(&self, tasks: Vec<Arc<dyn Task>>) {
        *self.tasks.write() = tasks;
    }

    /// Number of times `list` has been called
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Delay every fetch by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Make the next fetch fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.write() = Some(message.into());
    }
}

#[async_trait]
impl Service for MemoryService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<Arc<dyn Task>>, BoxError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = self.fail_next.write().take() {
            return Err(message.into());
        }

        Ok(self.tasks.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_list_returns_current_tasks() {
        let service = MemoryService::new("tracker1");
        service.set_tasks(vec![
            TaskRecord::new("1", "first", Utc::now()),
            TaskRecord::new("2", "second", Utc::now()),
        ]);

        let tasks = service.list().await.unwrap();
        let keys: Vec<&str> = tasks.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["1", "2"]);
        assert_eq!(service.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let service = MemoryService::new("tracker1");
        service.fail_next("502 bad gateway");

        let err = service.list().await.err().unwrap();
        assert_eq!(err.to_string(), "502 bad gateway");
        assert!(service.list().await.is_ok());
        assert_eq!(service.fetch_count(), 2);
    }
}
