//! Per-task directory holding `subject`, `message`, and `url`.

use super::node::{FileInfo, Node};
use super::text::Text;
use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::service::Task;
use crate::types::NodeId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub const SUBJECT: &str = "subject";
pub const MESSAGE: &str = "message";
pub const URL: &str = "url";

pub struct TaskDir {
    id: NodeId,
    info: FileInfo,
    task: Arc<dyn Task>,
    files: Mutex<Option<Vec<Arc<dyn Node>>>>,
}

impl TaskDir {
    pub fn new(task: Arc<dyn Task>) -> Self {
        Self {
            id: NodeId::next(),
            info: FileInfo::dir(task.key(), task.creation(), task.last_mod()),
            task,
            files: Mutex::new(None),
        }
    }

    pub fn task(&self) -> &Arc<dyn Task> {
        &self.task
    }

    fn new_text(&self, name: &str, content: &str) -> Arc<dyn Node> {
        // Leaves carry the tracker's timestamps, not the time they were built.
        Arc::new(Text::new(
            name,
            content,
            self.task.creation(),
            self.task.last_mod(),
        ))
    }
}

#[async_trait]
impl Node for TaskDir {
    fn id(&self) -> NodeId {
        self.id
    }

    fn stat(&self) -> &FileInfo {
        &self.info
    }

    async fn read_dir(&self, _cancel: &Cancellation) -> Result<Vec<Arc<dyn Node>>, FsError> {
        let mut files = self.files.lock();
        let files = files.get_or_insert_with(|| {
            vec![
                self.new_text(SUBJECT, self.task.subject()),
                self.new_text(MESSAGE, self.task.message()),
                self.new_text(URL, self.task.permalink()),
            ]
        });
        Ok(files.clone())
    }

    fn read_file(&self) -> Result<Vec<u8>, FsError> {
        Err(FsError::protocol("read_file", &self.info.name))
    }

    /// Task content is only renewed when the owning service directory rebuilds.
    async fn refresh(&self) {}
}
