//! Path-case canonicalization with a memoizing cache.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use fs_err as fs;

/// Directory-listing seam for [`PathCaseResolver`].
///
/// The resolver only ever needs entry names and existence checks; tests
/// substitute an in-memory tree to simulate a case-insensitive filesystem.
pub trait DirLister: Send + Sync {
    /// Names of the entries directly inside `dir`.
    fn entry_names(&self, dir: &Path) -> std::io::Result<Vec<String>>;

    /// Whether `path` exists at all (file or directory).
    fn exists(&self, path: &Path) -> bool;
}

/// The real-filesystem lister used outside of tests.
#[derive(Debug, Clone, Default)]
pub struct DiskLister;

impl DirLister for DiskLister {
    fn entry_names(&self, dir: &Path) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Recovers the on-disk letter-casing of paths.
///
/// On case-insensitive filesystems the same file reaches code under many
/// spellings; `resolve` maps any of them to the one spelling stored on disk
/// so paths can be compared and persisted. Results are memoized for the
/// life of the resolver, keyed by the input exactly as supplied, and
/// failures are memoized too so a dead path is probed once.
///
/// `resolve` never fails: when the casing cannot be recovered (the path
/// does not exist, a listing fails, a segment vanishes mid-walk) the input
/// comes back unchanged.
pub struct PathCaseResolver {
    lister: Box<dyn DirLister>,
    cache: Mutex<HashMap<PathBuf, PathBuf>>,
}

impl Default for PathCaseResolver {
    fn default() -> Self {
        Self::new(Box::new(DiskLister))
    }
}

impl PathCaseResolver {
    pub fn new(lister: Box<dyn DirLister>) -> Self {
        Self {
            lister,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `path` with every segment's casing corrected to match what
    /// exists on disk.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        // The lock is held across the walk so concurrent callers probe a
        // given key at most once.
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(hit) = cache.get(path) {
            return hit.clone();
        }

        let resolved = self.resolve_uncached(path).unwrap_or_else(|| {
            log::warn!("Could not recover on-disk casing of {}", path.display());
            path.to_path_buf()
        });
        cache.insert(path.to_path_buf(), resolved.clone());
        resolved
    }

    /// Drops every memoized entry.
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn resolve_uncached(&self, input: &Path) -> Option<PathBuf> {
        let absolute = if input.is_absolute() {
            input.to_path_buf()
        } else {
            std::env::current_dir().ok()?.join(input)
        };
        let normalized = normalize(&absolute);

        if !self.lister.exists(&normalized) {
            return None;
        }

        // Walk from the leaf up, correcting one segment per level. A level
        // where the listing fails or nothing matches (the entry vanished
        // since the existence check) makes the whole call unresolvable.
        let mut segments = Vec::new();
        let mut current = normalized.as_path();
        while let Some(parent) = current.parent() {
            let supplied = current.file_name()?.to_string_lossy().to_lowercase();
            let on_disk = self
                .lister
                .entry_names(parent)
                .ok()?
                .into_iter()
                .find(|name| name.to_lowercase() == supplied)?;
            segments.push(on_disk);
            current = parent;
        }

        let mut result = PathBuf::from(recase_root(&current.to_string_lossy()));
        for segment in segments.iter().rev() {
            result.push(segment);
        }
        Some(result)
    }
}

/// Resolves `.` and `..` components lexically, without touching the disk.
fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // "/.." is "/": only a named component can be popped
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            c => components.push(c),
        }
    }
    components.iter().collect()
}

/// Synthesizes casing for the filesystem root, which no directory listing
/// covers.
///
/// Drive-letter roots are upper-cased, UNC server/share roots title-cased
/// per component, and a plain `/` root has no letters to case.
fn recase_root(root: &str) -> String {
    if root.contains(':') {
        root.to_uppercase()
    } else if root.contains('\\') {
        root.split('\\')
            .map(title_case)
            .collect::<Vec<_>>()
            .join("\\")
    } else {
        root.to_string()
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
