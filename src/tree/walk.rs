//! Path resolution and traversal over the node tree.

use super::node::{FileInfo, Node};
use crate::concurrency::Cancellation;
use crate::error::FsError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

/// Split a slash-separated path into names, ignoring empty and `.` components.
pub fn components(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect()
}

/// Resolve `path` from `root` by listing each directory on the way down.
pub async fn lookup(
    root: Arc<dyn Node>,
    path: &str,
    cancel: &Cancellation,
) -> Result<Arc<dyn Node>, FsError> {
    let mut current = root;
    for name in components(path) {
        if !current.stat().is_dir() {
            return Err(FsError::NotFound(path.to_string()));
        }
        let children = current.read_dir(cancel).await?;
        current = children
            .into_iter()
            .find(|child| child.stat().name == name)
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;
    }
    Ok(current)
}

/// One node visited by [`walk`]
#[derive(Debug, Clone)]
pub struct WalkEntry {
    /// Path relative to the walk's starting node
    pub path: String,
    pub info: FileInfo,
}

/// Depth-first listing of everything below `node`, in listing order.
///
/// A directory whose listing fails aborts the walk with that error.
pub async fn walk(node: Arc<dyn Node>, cancel: &Cancellation) -> Result<Vec<WalkEntry>, FsError> {
    let mut out = Vec::new();
    walk_into(node, String::new(), cancel, &mut out).await?;
    Ok(out)
}

fn walk_into<'a>(
    node: Arc<dyn Node>,
    prefix: String,
    cancel: &'a Cancellation,
    out: &'a mut Vec<WalkEntry>,
) -> BoxFuture<'a, Result<(), FsError>> {
    async move {
        for child in node.read_dir(cancel).await? {
            let path = if prefix.is_empty() {
                child.stat().name.clone()
            } else {
                format!("{}/{}", prefix, child.stat().name)
            };
            out.push(WalkEntry {
                path: path.clone(),
                info: child.stat().clone(),
            });
            if child.stat().is_dir() {
                walk_into(child, path, cancel, out).await?;
            }
        }
        Ok(())
    }
    .boxed()
}
