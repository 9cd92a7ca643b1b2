//! Work-tree probes over the version-control CLI.
//!
//! Both probes shell out to the configured tool (normally `git`) with the
//! probed path as working directory, via [`CommandRunner`]. A missing tool,
//! a directory outside any repository, and a timed-out probe all read as
//! "not applicable"; probes never fail.

use std::path::{Path, PathBuf};

use crate::runner::CommandRunner;

/// Probes a directory's relationship to a version-control working tree.
#[derive(Debug, Clone)]
pub struct GitProbe {
    tool: String,
    runner: CommandRunner,
}

impl Default for GitProbe {
    fn default() -> Self {
        Self::new("git", CommandRunner::default())
    }
}

impl GitProbe {
    pub fn new(tool: impl Into<String>, runner: CommandRunner) -> Self {
        Self {
            tool: tool.into(),
            runner,
        }
    }

    /// Whether `path` lies inside a working tree.
    pub fn is_inside_work_tree(&self, path: &Path) -> bool {
        let out = self
            .runner
            .run(&self.tool, &["rev-parse", "--is-inside-work-tree"], path);
        log::debug!(
            "{} rev-parse --is-inside-work-tree in {}: {:?}",
            self.tool,
            path.display(),
            out
        );
        out.as_deref() == Some("true")
    }

    /// The root of the working tree enclosing `path`, if any.
    pub fn repository_root(&self, path: &Path) -> Option<PathBuf> {
        let out = self
            .runner
            .run(&self.tool, &["rev-parse", "--show-toplevel"], path)?;
        Some(PathBuf::from(out))
    }

    /// The executable the probe invokes.
    pub fn tool(&self) -> &str {
        &self.tool
    }
}
