//! Tooling & Integration Layer
//!
//! Command-line access to the tree and the formatting it uses.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands};
