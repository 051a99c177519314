/*!
 * Content scan: walk, resolve each file, stream blocks into bounded parts
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Local;
use indicatif::ProgressBar;
use strum::IntoEnumIterator;
use tracing::info;

use crate::config::{Config, SCAN_REPORT_PREFIX};
use crate::error::Result;
use crate::report::{OutputInfo, RunSummary};
use crate::resolver::{ContentResolver, DiskSource, FileSource};
use crate::types::ContentKind;
use crate::utils::{file_timestamp, header_timestamp, report_stem};
use crate::walker::Walker;
use crate::writer::{FilePartStore, PartHeader, PartStore, PartWriter};

/// Scanner statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Directories visited, including the root
    pub directories: usize,
    /// Files turned into blocks
    pub files: usize,
    /// Block counts per content kind
    pub kinds: BTreeMap<ContentKind, usize>,
}

/// Content scanner for one directory
pub struct Scanner<S = DiskSource> {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    resolver: ContentResolver<S>,
}

impl Scanner<DiskSource> {
    /// Create a new scanner reading from disk
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self::with_resolver(config, progress, ContentResolver::new())
    }
}

impl<S: FileSource> Scanner<S> {
    /// Create a scanner with a custom resolver
    pub fn with_resolver(
        config: Config,
        progress: Arc<ProgressBar>,
        resolver: ContentResolver<S>,
    ) -> Self {
        Self {
            config,
            progress,
            resolver,
        }
    }

    /// Scan the target directory into `scan-report-...-part<N>.txt` files
    pub fn scan(&self) -> Result<RunSummary> {
        let now = Local::now();
        let stem = format!(
            "{}{}",
            report_stem(SCAN_REPORT_PREFIX, &self.config.target_dir),
            file_timestamp(&now)
        );
        let store = FilePartStore::new(&self.config.output_dir, stem);

        let (_, summary) = self.scan_into(store, &header_timestamp(&now))?;
        Ok(summary)
    }

    /// Scan the target directory into an arbitrary part store
    pub fn scan_into<P: PartStore>(&self, store: P, generated_at: &str) -> Result<(P, RunSummary)> {
        let header = PartHeader {
            root: self.config.target_dir.display().to_string(),
            generated_at: generated_at.to_string(),
        };
        let mut writer = PartWriter::start(store, self.config.limits, header)?;
        let mut stats = ScannerStatistics::default();

        info!(root = %self.config.target_dir.display(), "starting content scan");

        let walker = Walker::new(&self.config.target_dir)
            .exclude_prefixes(self.config.excluded_prefixes());

        for entry in walker {
            if entry.is_dir {
                stats.directories += 1;
                continue;
            }

            self.progress.set_message(format!("Current file: {}", display_name(&entry.name)));

            let block = self.resolver.resolve(&entry.path);
            *stats.kinds.entry(block.kind()).or_insert(0) += 1;
            stats.files += 1;

            writer.submit(&block)?;
            self.progress.inc(1);
        }

        let (store, parts) = writer.finish()?;
        info!(parts = parts.len(), files = stats.files, "content scan complete");

        let summary = RunSummary {
            root: self.config.target_dir.display().to_string(),
            outputs: parts
                .into_iter()
                .map(|part| OutputInfo {
                    number: part.number,
                    location: part.location,
                    bytes: part.bytes,
                    items: part.blocks,
                })
                .collect(),
            duration: Default::default(),
            directories: stats.directories,
            files: stats.files,
            breakdown: ContentKind::iter()
                .map(|kind| (kind.to_string(), stats.kinds.get(&kind).copied().unwrap_or(0)))
                .collect(),
        };

        Ok((store, summary))
    }
}

/// Truncate long names so the progress line stays on one row
fn display_name(name: &str) -> String {
    let count = name.chars().count();
    if count > 40 {
        let tail: String = name.chars().skip(count - 37).collect();
        format!("...{}", tail)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportMode;
    use crate::writer::{MemoryPartStore, PartLimits};
    use std::fs;
    use tempfile::tempdir;

    fn scanner(config: Config) -> Scanner {
        Scanner::new(config, Arc::new(ProgressBar::hidden()))
    }

    #[test]
    fn single_small_text_file_yields_one_part() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("note.txt"), "0123456789").unwrap();

        let mut config = Config::new(ReportMode::Scan, &root, dir.path());
        config.limits = PartLimits {
            max_part_size: 1000,
            safety_margin: 0,
        };
        let (store, summary) = scanner(config)
            .scan_into(MemoryPartStore::new(), "2024-01-02 03:04:05")
            .unwrap();

        assert_eq!(summary.outputs.len(), 1);
        assert_eq!(summary.outputs[0].items, 1);
        assert_eq!(summary.files, 1);
        let text = &store.texts()[0];
        assert_eq!(text.matches("--- File path (TEXT):").count(), 1);
        assert!(text.contains("0123456789\n--- End of content of note.txt ---"));
    }

    #[test]
    fn counts_blocks_by_kind() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("mixed");
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("Dockerfile"), "FROM scratch").unwrap();
        fs::write(root.join("archive.tar.gz"), [0u8; 64]).unwrap();
        fs::write(root.join("nested").join("blob.xyz"), "??").unwrap();

        let config = Config::new(ReportMode::Scan, &root, dir.path());
        let (store, summary) = scanner(config)
            .scan_into(MemoryPartStore::new(), "now")
            .unwrap();

        assert_eq!(summary.directories, 2);
        assert_eq!(summary.files, 3);
        let counts: BTreeMap<String, usize> = summary.breakdown.into_iter().collect();
        assert_eq!(counts["TEXT"], 1);
        assert_eq!(counts["BINARY"], 1);
        assert_eq!(counts["OTHER"], 1);
        assert_eq!(counts["ERROR"], 0);

        let text = &store.texts()[0];
        assert!(text.contains("FROM scratch\n"));
        assert!(text.contains("Size: 64 bytes]"));
    }

    #[test]
    fn long_names_are_shortened_for_progress() {
        let long = "a".repeat(60);
        let shown = display_name(&long);
        assert_eq!(shown.chars().count(), 40);
        assert!(shown.starts_with("..."));
        assert_eq!(display_name("short.rs"), "short.rs");
    }
}
