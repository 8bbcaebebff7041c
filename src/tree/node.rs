//! Node primitives: metadata, the capability traits, and directory entries.

use crate::concurrency::Cancellation;
use crate::error::FsError;
use crate::types::NodeId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// POSIX type bit for directories
pub const S_IFDIR: u32 = 0o040000;
/// POSIX type bit for regular files
pub const S_IFREG: u32 = 0o100000;

/// Permission bits plus a directory flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    const DIR: u32 = 1 << 31;
    const PERM_MASK: u32 = 0o777;

    pub const fn dir(perm: u32) -> Self {
        FileMode(Self::DIR | (perm & Self::PERM_MASK))
    }

    pub const fn file(perm: u32) -> Self {
        FileMode(perm & Self::PERM_MASK)
    }

    pub const fn is_dir(self) -> bool {
        self.0 & Self::DIR != 0
    }

    pub const fn perm(self) -> u32 {
        self.0 & Self::PERM_MASK
    }

    /// Mode word as a host driver reports it in attributes
    pub const fn unix_mode(self) -> u32 {
        if self.is_dir() {
            S_IFDIR | self.perm()
        } else {
            S_IFREG | self.perm()
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() { 'd' } else { '-' };
        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6, 3, 0] {
            let bits = (self.perm() >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

/// Node metadata, fixed for the node's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mode: FileMode,
    pub creation: DateTime<Utc>,
    pub last_mod: DateTime<Utc>,
}

impl FileInfo {
    pub fn dir(name: impl Into<String>, creation: DateTime<Utc>, last_mod: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            mode: FileMode::dir(0o755),
            creation,
            last_mod,
        }
    }

    pub fn file(
        name: impl Into<String>,
        size: u64,
        creation: DateTime<Utc>,
        last_mod: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            mode: FileMode::file(0o644),
            creation,
            last_mod,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    pub fn unix_mode(&self) -> u32 {
        self.mode.unix_mode()
    }
}

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Directory entry record handed to a host driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub mode: u32,
    pub kind: EntryKind,
}

impl From<&FileInfo> for DirEntry {
    fn from(info: &FileInfo) -> Self {
        DirEntry {
            name: info.name.clone(),
            mode: info.unix_mode(),
            kind: if info.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
        }
    }
}

/// Capability set shared by every tree node
///
/// Directory kinds answer `read_dir`; leaf kinds answer `read_file`. The other
/// operation fails with `FsError::ProtocolViolation`.
#[async_trait]
pub trait Node: Send + Sync {
    fn id(&self) -> NodeId;

    fn stat(&self) -> &FileInfo;

    async fn read_dir(&self, cancel: &Cancellation) -> Result<Vec<Arc<dyn Node>>, FsError>;

    fn read_file(&self) -> Result<Vec<u8>, FsError>;

    /// Drop cached state so the next listing rebuilds it
    async fn refresh(&self);

    /// Write capability, present only on control files
    fn as_writable(&self) -> Option<&dyn Writable> {
        None
    }
}

/// Write capability
#[async_trait]
pub trait Writable: Send + Sync {
    async fn write_file(&self, data: &[u8]) -> Result<(), FsError>;
}

/// Write `data` to `node`, failing for nodes without the write capability.
pub async fn write_file(node: &dyn Node, data: &[u8]) -> Result<(), FsError> {
    match node.as_writable() {
        Some(writable) => writable.write_file(data).await,
        None => Err(FsError::protocol("write_file", &node.stat().name)),
    }
}

/// Directory entries for a listing, in listing order
pub fn dir_entries(nodes: &[Arc<dyn Node>]) -> Vec<DirEntry> {
    nodes.iter().map(|node| DirEntry::from(node.stat())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_mode() {
        let mode = FileMode::dir(0o755);
        assert!(mode.is_dir());
        assert_eq!(mode.perm(), 0o755);
        assert_eq!(mode.unix_mode(), 0o040755);
        assert_eq!(mode.to_string(), "drwxr-xr-x");
    }

    #[test]
    fn test_file_mode() {
        let mode = FileMode::file(0o644);
        assert!(!mode.is_dir());
        assert_eq!(mode.unix_mode(), 0o100644);
        assert_eq!(mode.to_string(), "-rw-r--r--");
    }

    #[test]
    fn test_perm_is_masked() {
        assert_eq!(FileMode::file(0o7777).perm(), 0o777);
    }

    #[test]
    fn test_dir_entry_from_info() {
        let now = Utc::now();
        let entry = DirEntry::from(&FileInfo::dir("github", now, now));
        assert_eq!(entry.name, "github");
        assert_eq!(entry.kind, EntryKind::Directory);
        assert_eq!(entry.mode, 0o040755);

        let entry = DirEntry::from(&FileInfo::file("subject", 12, now, now));
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.mode, 0o100644);
    }
}
