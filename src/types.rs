/*!
 * Core types and data structures for dirreport
 */

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use strum::{Display, EnumIter};

/// One filesystem node visited during traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path, rooted at the scan target as given
    pub path: PathBuf,
    /// Base name of the node
    pub name: String,
    /// Distance from the scan root (the root itself is 0)
    pub depth: usize,
    /// Whether the node is a directory
    pub is_dir: bool,
}

/// Coarse file-type tag used by the structure map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Category {
    /// Manifests, lockfiles, dotfiles and config formats
    Configuration,
    /// Program source code
    Source,
    /// Prose, office documents and tabular text
    Document,
    /// Raster and vector images
    Image,
    /// Compressed archives
    Archive,
    /// Anything not matched by another rule
    Other,
}

/// How a file's content is represented in a scan report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ContentKind {
    /// Full decoded text is inlined
    Text,
    /// Known binary format; only the size is reported
    Binary,
    /// Unrecognized format; only the size is reported
    Other,
    /// The file was expected to be text but could not be read
    Error,
}

/// Self-describing text unit for one scanned file: header, body and footer.
///
/// The rendered text and its UTF-8 length are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    path: PathBuf,
    kind: ContentKind,
    text: String,
}

impl ContentBlock {
    /// Render a block for `path` around an already materialized body.
    ///
    /// The body is expected to end with a newline.
    pub fn new(path: &Path, kind: ContentKind, body: &str) -> Self {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let footer = match kind {
            ContentKind::Text | ContentKind::Error => "End of content of",
            ContentKind::Binary | ContentKind::Other => "End of summary of",
        };

        let mut text = String::with_capacity(body.len() + 128);
        let _ = write!(text, "--- File path ({}): {} ---\n", kind, path.display());
        text.push_str(body);
        let _ = write!(text, "--- {} {} ---\n\n", footer, name);

        Self {
            path: path.to_path_buf(),
            kind,
            text,
        }
    }

    /// Path of the file this block describes
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Content kind of the block
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Rendered block text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Size of the rendered block in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the rendered block is empty (never true for a constructed block)
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for ContentBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
