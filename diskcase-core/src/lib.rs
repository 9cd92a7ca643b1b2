//! diskcase core library
//!
//! Recovers the on-disk letter-casing of paths on case-insensitive
//! filesystems and keeps tool data files registered in a repository's
//! ignore file.
//!
//! # Architecture
//!
//! - `resolver`: PathCaseResolver and its directory-listing seam
//! - `runner`: bounded synchronous subprocess capture
//! - `git`: work-tree probes over the version-control CLI
//! - `ignore`: idempotent ignore-file entry registration
//! - `config`: `diskcase.toml` discovery and defaults

pub mod config;
pub mod error;
pub mod git;
pub mod ignore;
pub mod resolver;
pub mod runner;

pub use config::Config;
pub use error::Error;
pub use git::GitProbe;
pub use ignore::IgnoreFile;
pub use resolver::{DirLister, DiskLister, PathCaseResolver};
pub use runner::CommandRunner;
