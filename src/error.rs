//! Error types
//!
//! `FsError` covers tree operations as seen by a host driver. `ApiError` wraps it
//! for the configuration, logging, and CLI layers.

use thiserror::Error;

/// Boxed error returned by service adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by tree operations
#[derive(Debug, Error)]
pub enum FsError {
    /// Operation invalid for the node's kind (read_file on a directory, read_dir on a leaf)
    #[error("protocol botch: {op} on {name}")]
    ProtocolViolation { op: &'static str, name: String },

    /// The service's list fetch failed; the cache stays empty
    #[error("fetching tasks from {service}: {source}")]
    Upstream {
        service: String,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the fetch before it completed
    #[error("fetching tasks from {service}: cancelled")]
    Cancelled { service: String },

    /// Unrecognized control-file verb
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A service with this name is already registered
    #[error("service already registered: {0}")]
    DuplicateService(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),
}

impl FsError {
    pub(crate) fn protocol(op: &'static str, name: &str) -> Self {
        FsError::ProtocolViolation {
            op,
            name: name.to_string(),
        }
    }

    /// True for errors a caller may clear by re-issuing the same operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, FsError::Upstream { .. } | FsError::Cancelled { .. })
    }
}

/// Errors surfaced by configuration, logging, and command execution
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid usage: {0}")]
    Usage(String),

    /// The command was abandoned on an interrupt
    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
