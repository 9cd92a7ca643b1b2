//! Idempotent ignore-file entry registration.

use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::error::Error;

/// Editor for one repository's ignore-file.
///
/// `path` is the ignore-file itself, `base` the directory entries are made
/// relative to (normally the repository root), and `header` the comment
/// written above entries this tool adds.
#[derive(Debug, Clone)]
pub struct IgnoreFile {
    path: PathBuf,
    base: PathBuf,
    header: String,
}

impl IgnoreFile {
    pub fn new(
        path: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        header: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            header: header.into(),
        }
    }

    /// Registers `file` in the ignore-file unless an equivalent line is
    /// already present. Returns whether the file was modified.
    ///
    /// An absolute `file` must live under the base; a relative one is taken
    /// as already base-relative. When the ignore-file does not exist it is
    /// only created (holding the header comment and the new entry) if
    /// `create_if_missing` is set; otherwise nothing is written and `false`
    /// is returned.
    pub fn add_entry_if_missing(
        &self,
        file: &Path,
        create_if_missing: bool,
    ) -> Result<bool, Error> {
        let relative = self.relativize(file)?;
        let entry = relative.to_string_lossy().replace('\\', "/");

        let existing = if self.path.is_file() {
            fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?
        } else if create_if_missing {
            String::new()
        } else {
            log::debug!(
                "{} does not exist and creation is disabled",
                self.path.display()
            );
            return Ok(false);
        };

        if existing.lines().any(|line| line_lists(line, &entry)) {
            log::debug!("{} already listed in {}", entry, self.path.display());
            return Ok(false);
        }

        let mut content = existing;
        if !content.is_empty() {
            if !content.ends_with('\n') {
                content.push('\n');
            }
            content.push('\n');
        }
        content.push_str(&format!("# {}\n/{}\n", self.header, entry));

        fs::write(&self.path, content).map_err(|e| Error::io(&self.path, e))?;
        log::info!("Registered {} in {}", entry, self.path.display());
        Ok(true)
    }

    /// The ignore-file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn relativize(&self, file: &Path) -> Result<PathBuf, Error> {
        if file.is_absolute() {
            file.strip_prefix(&self.base)
                .map(|p| p.to_path_buf())
                .map_err(|_| Error::outside_workspace(file))
        } else {
            Ok(file.to_path_buf())
        }
    }
}

/// Whether an ignore-file line already lists `entry`.
///
/// A line counts when, after trimming, it equals the entry exactly or is
/// the entry preceded by a single non-`#` byte (the `/` anchor this editor
/// writes, or a `!` from hand edits). Comments and longer names that merely
/// end with the entry do not count.
fn line_lists(line: &str, entry: &str) -> bool {
    let line = line.trim();
    if line == entry {
        return true;
    }
    match line.strip_suffix(entry) {
        Some(prefix) => prefix.len() == 1 && prefix != "#",
        None => false,
    }
}
