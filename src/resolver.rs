/*!
 * Per-file content resolution for scan reports
 */

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::classifier::file_extension;
use crate::types::{ContentBlock, ContentKind};
use crate::utils::format_file_size;

/// Extensions whose content is inlined
pub static TEXT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        ".txt", ".php", ".js", ".jsx", ".json", ".xml", ".html", ".css", ".md", ".yml", ".yaml",
        ".conf", ".log", ".csv", ".tsv", ".ini", ".sh", ".py", ".rb", ".java", ".c", ".cpp", ".h",
        ".hpp", ".ts", ".tsx", ".vue", ".go", ".rs", ".swift", ".kt", ".sql", ".toml",
    ])
});

/// Exact file names whose content is inlined even without a text extension
pub static TEXT_FILE_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "Dockerfile",
        ".env",
        "Makefile",
        "LICENSE",
        "README",
        "CHANGELOG",
        "package.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "composer.json",
        "Gemfile",
        "Rakefile",
        ".gitignore",
        ".gitattributes",
        ".editorconfig",
    ])
});

/// Extensions that are summarized by size and never opened
pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        ".zip", ".gz", ".tar", ".rar", ".7z", ".bz2", ".tgz", ".mp3", ".mp4", ".avi", ".mov",
        ".wmv", ".flv", ".webm", ".mkv", ".ogg", ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff",
        ".ico", ".svg", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods",
        ".odp", ".bin", ".exe", ".dll", ".so", ".o", ".class", ".jar", ".apk", ".iso", ".img",
        ".dmg", ".vmdk", ".sqlite", ".db", ".dat", ".mdb", ".accdb", ".bak", ".tmp", ".swp",
        ".swo", ".pyc", ".pyo", ".lock",
    ])
});

/// Read access to scanned files
pub trait FileSource {
    /// Size of the file in bytes
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Entire file content
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// `FileSource` backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl FileSource for DiskSource {
    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Decide how a file appears in the scan report: TEXT, BINARY, OTHER or ERROR
#[derive(Debug, Clone, Default)]
pub struct ContentResolver<S = DiskSource> {
    source: S,
}

impl ContentResolver<DiskSource> {
    /// Create a resolver reading from disk
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: FileSource> ContentResolver<S> {
    /// Create a resolver over a custom file source
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Produce the report block for one file.
    ///
    /// Never fails: metadata and read errors are rendered into the block.
    pub fn resolve(&self, path: &Path) -> ContentBlock {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let extension = file_extension(&name);
        let extension = extension.as_deref();

        if extension.is_some_and(|ext| BINARY_EXTENSIONS.contains(ext)) {
            debug!(path = %path.display(), "summarizing known binary file");
            let body = self.size_summary(path, "known binary file");
            return ContentBlock::new(path, ContentKind::Binary, &body);
        }

        if TEXT_FILE_NAMES.contains(name.as_str())
            || extension.is_some_and(|ext| TEXT_EXTENSIONS.contains(ext))
        {
            return self.read_text(path);
        }

        debug!(path = %path.display(), "summarizing unrecognized file");
        let body = self.size_summary(path, "file type not configured for reading");
        ContentBlock::new(path, ContentKind::Other, &body)
    }

    fn read_text(&self, path: &Path) -> ContentBlock {
        match self.source.read(path) {
            Ok(bytes) => {
                let mut content = String::from_utf8_lossy(&bytes).into_owned();
                if !content.ends_with('\n') {
                    content.push('\n');
                }
                debug!(path = %path.display(), bytes = bytes.len(), "inlining text file");
                ContentBlock::new(path, ContentKind::Text, &content)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read text file");
                ContentBlock::new(
                    path,
                    ContentKind::Error,
                    &format!("[ERROR READING FILE: {}]\n", e),
                )
            }
        }
    }

    fn size_summary(&self, path: &Path, reason: &str) -> String {
        match self.source.size(path) {
            Ok(size) if size < 1024 => {
                format!("[Content omitted: {}. Size: {} bytes]\n", reason, size)
            }
            Ok(size) => format!(
                "[Content omitted: {}. Size: {} ({} bytes)]\n",
                reason,
                format_file_size(size),
                size
            ),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file size");
                format!("[Content omitted: {}. Could not read size: {}]\n", reason, e)
            }
        }
    }
}
