//! Task Tree
//!
//! The synthetic directory tree a host filesystem driver serves:
//!
//! ```text
//! /
//!   <service>/
//!     <task key>/
//!       subject
//!       message
//!       url
//!     ctl
//! ```
//!
//! Directories are populated lazily on first listing. Service listings are cached
//! until `refresh` is written to the service's `ctl` file.

pub mod ctl;
pub mod node;
pub mod root;
pub mod service_dir;
pub mod task_dir;
pub mod text;
pub mod walk;

pub use ctl::{parse_command, Command, Ctl, CTL};
pub use node::{dir_entries, write_file, DirEntry, EntryKind, FileInfo, FileMode, Node, Writable};
pub use root::Root;
pub use service_dir::ServiceDir;
pub use task_dir::{TaskDir, MESSAGE, SUBJECT, URL};
pub use text::Text;
pub use walk::{lookup, walk, WalkEntry};
