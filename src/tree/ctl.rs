//! Control file
//!
//! The only writable node in the tree. A write is parsed as whitespace-separated
//! tokens; the first token selects the command:
//!
//! - *(empty)*: ignored
//! - `refresh`: drop the owning service directory's cached listing
//!
//! Anything else is rejected with `FsError::UnknownCommand` and changes nothing.

use super::node::{FileInfo, Node, Writable};
use super::service_dir::ServiceState;
use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::types::NodeId;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Weak};
use tracing::{info, warn};

pub const CTL: &str = "ctl";

/// Parsed control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
}

/// Parse a control-file payload. `Ok(None)` means the payload held no command.
pub fn parse_command(data: &[u8]) -> Result<Option<Command>, FsError> {
    let text = String::from_utf8_lossy(data);
    match text.split_whitespace().next() {
        None => Ok(None),
        Some("refresh") => Ok(Some(Command::Refresh)),
        Some(other) => Err(FsError::UnknownCommand(other.to_string())),
    }
}

pub struct Ctl {
    id: NodeId,
    info: FileInfo,
    parent: Weak<ServiceState>,
}

impl Ctl {
    pub(crate) fn new(parent: Weak<ServiceState>) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::next(),
            info: FileInfo::file(CTL, 0, now, now),
            parent,
        }
    }

    fn run(&self, command: Command) {
        match command {
            Command::Refresh => match self.parent.upgrade() {
                Some(parent) => {
                    info!(service = %parent.name(), "Refresh requested via ctl");
                    parent.clear();
                }
                None => warn!("Refresh requested for a service directory that no longer exists"),
            },
        }
    }
}

#[async_trait]
impl Node for Ctl {
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
        Ok(Vec::new())
    }

    async fn refresh(&self) {}

    fn as_writable(&self) -> Option<&dyn Writable> {
        Some(self)
    }
}

#[async_trait]
impl Writable for Ctl {
    async fn write_file(&self, data: &[u8]) -> Result<(), FsError> {
        if let Some(command) = parse_command(data)? {
            self.run(command);
        }
        Ok(())
    }
}
