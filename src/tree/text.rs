//! Read-only leaf with fixed content.

use super::node::{FileInfo, Node};
use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::types::NodeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct Text {
    id: NodeId,
    info: FileInfo,
    data: Vec<u8>,
}

impl Text {
    /// Size is taken from the content's byte length.
    pub fn new(
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        creation: DateTime<Utc>,
        last_mod: DateTime<Utc>,
    ) -> Self {
        let data = content.into();
        Self {
            id: NodeId::next(),
            info: FileInfo::file(name, data.len() as u64, creation, last_mod),
            data,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.data
    }
}

#[async_trait]
impl Node for Text {
    fn id(&self) -> NodeId {
        self.id
    }

    fn stat(&self) -> &FileInfo {
        &self.info
    }

    async fn read_dir(&self, _cancel: &Cancellation) -> Result<Vec<Arc<dyn Node>>, FsError> {
        Err(FsError::protocol("read_dir", &self.info.name))
    }

    fn read_file(&self) -> Result<Vec<u8>, FsError> {
        Ok(self.data.clone())
    }

    async fn refresh(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_is_a_leaf() {
        let now = Utc::now();
        let text = Text::new("subject", "héllo", now, now);
        assert_eq!(text.stat().size, 6);
        assert!(!text.stat().is_dir());
        assert_eq!(text.read_file().unwrap(), "héllo".as_bytes());

        let err = text.read_dir(&Cancellation::new()).await.err().unwrap();
        assert!(matches!(err, FsError::ProtocolViolation { op: "read_dir", .. }));
    }

    #[tokio::test]
    async fn test_refresh_keeps_content() {
        let now = Utc::now();
        let text = Text::new("url", "https://example.com/1", now, now);
        text.refresh().await;
        assert_eq!(text.content(), b"https://example.com/1");
    }
}
