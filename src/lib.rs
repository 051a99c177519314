/*!
 * dirreport - Plain-text directory reports for LLM context
 *
 * Two pipelines share one walker: a structure map listing every directory
 * and file with a coarse type, and a content scan that inlines text files,
 * summarizes everything else and splits the result into size-bounded parts.
 */

pub mod classifier;
pub mod config;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;


// Re-export main components for easier access
pub use classifier::{classify, Classifier};
pub use config::{Config, ReportMode};
pub use error::{ReportError, Result};
pub use mapper::StructureMapper;
pub use report::{ReportFormat, Reporter, RunSummary};
pub use resolver::{ContentResolver, DiskSource, FileSource};
pub use scanner::Scanner;
pub use types::{Category, ContentBlock, ContentKind, Entry};
pub use utils::{count_files, format_file_size};
pub use walker::Walker;
pub use writer::{FilePartStore, MemoryPartStore, PartLimits, PartStore, PartWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
