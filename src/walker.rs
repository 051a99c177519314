/*!
 * Deterministic directory traversal
 */

use std::cmp::Ordering;
use std::path::Path;

use tracing::{trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::types::Entry;

/// Lazy depth-first traversal of a directory tree.
///
/// A directory is yielded before its children. Inside each directory, files
/// come first in ascending name order, followed by subdirectories in the
/// order the filesystem lists them, each fully traversed before the next.
/// Symbolic links are never followed. Links to files are reported as files;
/// links to directories are left out.
pub struct Walker {
    inner: walkdir::IntoIter,
    excluded_prefixes: Vec<String>,
}

impl Walker {
    /// Start a traversal rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by(files_then_directories)
            .into_iter();

        Self {
            inner,
            excluded_prefixes: Vec::new(),
        }
    }

    /// Skip files whose name starts with any of the given prefixes
    pub fn exclude_prefixes<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.excluded_prefixes.extend(prefixes);
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

impl Iterator for Walker {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        loop {
            match self.inner.next()? {
                Ok(dent) => {
                    let is_dir = dent.file_type().is_dir();
                    let name = dent.file_name().to_string_lossy().to_string();

                    if !is_dir && self.is_excluded(&name) {
                        trace!(path = %dent.path().display(), "skipping report file");
                        continue;
                    }

                    if dent.depth() > 0 && dent.path_is_symlink() && dent.path().is_dir() {
                        trace!(path = %dent.path().display(), "skipping symlinked directory");
                        continue;
                    }

                    let depth = dent.depth();
                    return Some(Entry {
                        path: dent.into_path(),
                        name,
                        depth,
                        is_dir,
                    });
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    warn!(path = %path, error = %err, "skipping unreadable entry");
                }
            }
        }
    }
}

/// Sibling order: files by name first, then directories in their listed
/// relative order. Relies on walkdir's stable sort.
fn files_then_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.file_type().is_dir(), b.file_type().is_dir()) {
        (false, false) => a.file_name().cmp(b.file_name()),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => Ordering::Equal,
    }
}
