/*!
 * Directory structure map
 *
 * Writes a single indented listing of every directory and file under the
 * root, tagging each file with its category.
 */

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use indicatif::ProgressBar;
use strum::IntoEnumIterator;
use tracing::info;

use crate::classifier::Classifier;
use crate::config::{Config, MAP_REPORT_PREFIX};
use crate::error::{ReportError, Result};
use crate::report::{OutputInfo, RunSummary};
use crate::types::{Category, Entry};
use crate::utils::{file_timestamp, header_timestamp, report_stem};
use crate::walker::Walker;

const RULE: &str = "-------------------------------------------------------------------";
const INDENT: &str = "    ";

/// Counters gathered while writing a map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapStats {
    pub directories: usize,
    pub files: usize,
    pub lines: usize,
    pub bytes: u64,
    pub categories: BTreeMap<Category, usize>,
}

/// Directory tracked until its blank separator line is decided
struct OpenDirectory {
    depth: usize,
    has_files: bool,
}

/// Writer adapter counting bytes and lines passed through
struct Counting<W> {
    inner: W,
    bytes: u64,
    lines: usize,
}

impl<W: Write> Counting<W> {
    fn line(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.bytes += text.len() as u64 + 1;
        self.lines += 1;
        Ok(())
    }
}

/// Structure map generator
pub struct StructureMapper {
    config: Config,
    progress: Arc<ProgressBar>,
    classifier: Classifier,
}

impl StructureMapper {
    /// Create a new mapper
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self {
            config,
            progress,
            classifier: Classifier::default(),
        }
    }

    /// Write the map report into the output directory
    pub fn map(&self) -> Result<RunSummary> {
        let now = Local::now();
        let file_name = format!(
            "{}{}.txt",
            report_stem(MAP_REPORT_PREFIX, &self.config.target_dir),
            file_timestamp(&now)
        );
        let path = self.config.output_dir.join(file_name);
        info!(path = %path.display(), "writing structure map");

        let file = File::create(&path).map_err(|e| ReportError::output(&path, e))?;
        let mut out = BufWriter::new(file);
        let stats = self
            .write_map(&mut out, &header_timestamp(&now))
            .map_err(|e| ReportError::output(&path, e))?;
        out.flush().map_err(|e| ReportError::output(&path, e))?;

        Ok(RunSummary {
            root: self.config.target_dir.display().to_string(),
            outputs: vec![OutputInfo {
                number: 1,
                location: path.display().to_string(),
                bytes: stats.bytes,
                items: stats.lines,
            }],
            duration: Default::default(),
            directories: stats.directories,
            files: stats.files,
            breakdown: Category::iter()
                .map(|c| (c.to_string(), stats.categories.get(&c).copied().unwrap_or(0)))
                .collect(),
        })
    }

    /// Render the whole map into `out`
    pub fn write_map<W: Write>(&self, out: W, generated_at: &str) -> io::Result<MapStats> {
        let mut out = Counting {
            inner: out,
            bytes: 0,
            lines: 0,
        };
        let mut stats = MapStats::default();

        out.line(&format!(
            "--- Project Structure Map: {} ---",
            self.config.target_dir.display()
        ))?;
        out.line(&format!("Generated at: {}", generated_at))?;
        out.line(RULE)?;
        out.line("")?;
        out.line("Purpose: understand the project layout from file names and types.")?;
        out.line("Symbols: [D] = Directory, [F] = File")?;
        out.line(RULE)?;
        out.line("")?;

        let walker = Walker::new(&self.config.target_dir)
            .exclude_prefixes(self.config.excluded_prefixes());
        let mut open_dir: Option<OpenDirectory> = None;

        for entry in walker {
            if entry.is_dir {
                if let Some(prev) = open_dir.take() {
                    // a child directory right after means the previous one was not empty
                    if prev.has_files || entry.depth == prev.depth + 1 {
                        out.line("")?;
                    }
                }
                out.line(&self.directory_line(&entry))?;
                stats.directories += 1;
                open_dir = Some(OpenDirectory {
                    depth: entry.depth,
                    has_files: false,
                });
            } else {
                let category = self.classifier.classify(&entry.name);
                out.line(&format!(
                    "{}[F] {} (Type: {})",
                    INDENT.repeat(entry.depth),
                    entry.name,
                    category
                ))?;
                self.progress.inc(1);
                stats.files += 1;
                *stats.categories.entry(category).or_insert(0) += 1;
                if let Some(dir) = open_dir.as_mut() {
                    dir.has_files = true;
                }
            }
        }

        if open_dir.is_some_and(|dir| dir.has_files) {
            out.line("")?;
        }

        out.line(RULE)?;
        out.line("Structure mapping complete.")?;
        out.inner.flush()?;

        stats.bytes = out.bytes;
        stats.lines = out.lines;
        Ok(stats)
    }

    fn directory_line(&self, entry: &Entry) -> String {
        let name = if entry.depth == 0 {
            root_name(&entry.path)
        } else {
            entry.name.clone()
        };
        format!("{}[D] {}/", INDENT.repeat(entry.depth), name)
    }
}

/// Final component of the root's canonical path, or the path as given
fn root_name(path: &Path) -> String {
    fs::canonicalize(path)
        .ok()
        .and_then(|abs| abs.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| path.display().to_string())
}
