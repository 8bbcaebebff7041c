//! taskfs: Task Trackers as a Filesystem
//!
//! Exposes remote task trackers as a read-mostly, lazily populated directory tree
//! that a host filesystem driver can serve. Each tracker is a directory of tasks;
//! each task is a directory of `subject`, `message`, and `url` files; writing
//! `refresh` to a tracker's `ctl` file drops its cached listing.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod tooling;
pub mod tree;
pub mod types;
