//! Configuration loaded from `diskcase.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::git::GitProbe;
use crate::ignore::IgnoreFile;
use crate::runner::CommandRunner;

pub const CONFIG_FILE_NAME: &str = "diskcase.toml";

const DEFAULT_TOOL: &str = "git";
const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_IGNORE_FILE: &str = ".gitignore";
const DEFAULT_HEADER: &str = "added by diskcase";

/// Optional settings read from `diskcase.toml`.
///
/// Every field has a default, so an empty file (or none at all) is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Executable used for work-tree probes
    tool: Option<String>,
    /// Probe timeout in milliseconds
    timeout_ms: Option<u64>,
    /// Ignore-file name, relative to the repository root
    ignore_file: Option<String>,
    /// Comment written above entries diskcase registers
    header: Option<String>,
}

impl Config {
    /// Reads the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::config(path, e.to_string()))
    }

    /// Walks up from `start` looking for `diskcase.toml`.
    ///
    /// `None` when no config file exists up to the filesystem root; the
    /// inner result reports an unreadable or unparsable file.
    pub fn find(start: impl AsRef<Path>) -> Option<Result<Self, Error>> {
        let mut dir = start.as_ref();
        loop {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                log::debug!("Found config at {}", candidate.display());
                return Some(Self::load(&candidate));
            }
            dir = dir.parent()?;
        }
    }

    pub fn save(&self, directory: impl AsRef<Path>) -> Result<(), Error> {
        let config_path = directory.as_ref().join(CONFIG_FILE_NAME);
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::config(&config_path, e.to_string()))?;
        fs::write(&config_path, content).map_err(|e| Error::io(&config_path, e))?;
        log::info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    pub fn tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    pub fn set_tool(&mut self, tool: String) {
        self.tool = Some(tool);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn ignore_file(&self) -> &str {
        self.ignore_file.as_deref().unwrap_or(DEFAULT_IGNORE_FILE)
    }

    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(DEFAULT_HEADER)
    }

    /// Builds the configured work-tree probe.
    ///
    /// The `DISKCASE_GIT` environment variable overrides the configured
    /// tool name.
    pub fn probe(&self) -> GitProbe {
        let tool = match std::env::var("DISKCASE_GIT") {
            Ok(t) if !t.is_empty() => t,
            _ => self.tool().to_string(),
        };
        GitProbe::new(tool, CommandRunner::new(self.timeout()))
    }

    /// Builds the configured ignore-file editor for a repository root.
    pub fn ignore_file_in(&self, root: &Path) -> IgnoreFile {
        IgnoreFile::new(root.join(self.ignore_file()), root, self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{create_file, create_temp_git_repo};

    #[test]
    fn defaults_apply_without_a_config_file() {
        let config = Config::default();
        assert_eq!(config.tool(), "git");
        assert_eq!(config.timeout(), Duration::from_millis(5_000));
        assert_eq!(config.ignore_file(), ".gitignore");
        assert_eq!(config.header(), "added by diskcase");
    }

    #[test]
    fn config_save_and_find_roundtrip() {
        let (_tmp, root) = create_temp_git_repo();

        let mut original = Config::default();
        original.set_tool("/usr/local/bin/git".to_string());
        original.save(&root).unwrap();

        let loaded = Config::find(&root).unwrap().unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn config_find_walks_up_from_subdirectories() {
        let (_tmp, root) = create_temp_git_repo();
        Config::default().save(&root).unwrap();

        let nested = root.join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        assert!(Config::find(&nested).is_some());
    }

    #[test]
    fn config_find_returns_none_without_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Config::find(tmp.path()).is_none());
    }

    #[test]
    fn unparsable_config_is_reported() {
        let (_tmp, root) = create_temp_git_repo();
        create_file(&root, CONFIG_FILE_NAME, b"tool = [not toml");

        let result = Config::find(&root).unwrap();
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn partial_config_falls_back_per_field() {
        let (_tmp, root) = create_temp_git_repo();
        create_file(&root, CONFIG_FILE_NAME, b"timeout_ms = 250\n");

        let config = Config::find(&root).unwrap().unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.tool(), "git");
        assert_eq!(config.ignore_file(), ".gitignore");
    }

    #[test]
    fn ignore_file_in_uses_the_configured_name_and_header() {
        let (_tmp, root) = create_temp_git_repo();
        create_file(
            &root,
            CONFIG_FILE_NAME,
            b"ignore_file = \".customignore\"\nheader = \"kept out of git\"\n",
        );

        let config = Config::find(&root).unwrap().unwrap();
        let ignore = config.ignore_file_in(&root);
        assert_eq!(ignore.path(), root.join(".customignore"));

        ignore
            .add_entry_if_missing(Path::new("data.bm"), true)
            .unwrap();
        let content = fs::read_to_string(root.join(".customignore")).unwrap();
        assert_eq!(content, "# kept out of git\n/data.bm\n");
    }

    #[test]
    fn env_var_overrides_the_configured_tool() {
        let mut config = Config::default();
        config.set_tool("gitx".to_string());
        assert_eq!(config.probe().tool(), "gitx");

        std::env::set_var("DISKCASE_GIT", "/opt/git/bin/git");
        let probe = config.probe();
        std::env::remove_var("DISKCASE_GIT");
        assert_eq!(probe.tool(), "/opt/git/bin/git");
    }
}
