/*!
 * Configuration handling for dirreport
 */

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};

use crate::error::{ReportError, Result};
use crate::utils::report_stem;
use crate::writer::{PartLimits, MAX_PART_SIZE, SAFETY_MARGIN};

/// File-name prefix of structure map reports
pub const MAP_REPORT_PREFIX: &str = "project-structure-map";

/// File-name prefix of content scan report parts
pub const SCAN_REPORT_PREFIX: &str = "scan-report";

/// Command-line arguments for dirreport
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dirreport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate plain-text reports of a directory for LLM context",
    long_about = "Walks a directory and writes either a map of its structure with a type for every file, or a content report that inlines text files and summarizes binaries, split into size-bounded parts."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Report to generate
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Map the directory structure with a type for every file
    Map(MapArgs),
    /// Dump file contents into size-bounded report parts
    Scan(ScanArgs),
}

/// Arguments of the `map` subcommand
#[derive(ClapArgs, Debug, Clone)]
pub struct MapArgs {
    /// Directory to map
    pub directory_path: String,

    /// Directory the report is written to
    #[arg(long, default_value = ".")]
    pub output_dir: String,
}

/// Arguments of the `scan` subcommand
#[derive(ClapArgs, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan
    pub directory_path: String,

    /// Directory the report parts are written to
    #[arg(long, default_value = ".")]
    pub output_dir: String,

    /// Maximum size of one report part in bytes
    #[arg(long, default_value_t = MAX_PART_SIZE)]
    pub max_part_size: u64,

    /// Headroom in bytes kept below the maximum when deciding to start a new part
    #[arg(long, default_value_t = SAFETY_MARGIN)]
    pub safety_margin: u64,
}

/// Which pipeline a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Single-file structure map
    Map,
    /// Multi-part content scan
    Scan,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Pipeline to run
    pub mode: ReportMode,

    /// Target directory to process
    pub target_dir: PathBuf,

    /// Directory receiving the report files
    pub output_dir: PathBuf,

    /// Part size budget (content scan only)
    pub limits: PartLimits,

    /// Log verbosity from the command line
    pub verbosity: u8,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        match args.command {
            Command::Map(map) => Self {
                mode: ReportMode::Map,
                target_dir: PathBuf::from(map.directory_path),
                output_dir: PathBuf::from(map.output_dir),
                limits: PartLimits::default(),
                verbosity: args.verbose,
            },
            Command::Scan(scan) => Self {
                mode: ReportMode::Scan,
                target_dir: PathBuf::from(scan.directory_path),
                output_dir: PathBuf::from(scan.output_dir),
                limits: PartLimits {
                    max_part_size: scan.max_part_size,
                    safety_margin: scan.safety_margin,
                },
                verbosity: args.verbose,
            },
        }
    }

    /// Configuration for a run with default limits
    pub fn new(mode: ReportMode, target_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            mode,
            target_dir: target_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            limits: PartLimits::default(),
            verbosity: 0,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.target_dir.is_dir() {
            return Err(ReportError::InvalidRoot(format!(
                "'{}' is not a valid directory",
                self.target_dir.display()
            )));
        }

        crate::ensure!(
            self.output_dir.is_dir(),
            Config,
            "Output directory not found: {}",
            self.output_dir.display()
        );

        if self.mode == ReportMode::Scan {
            crate::ensure!(
                self.limits.max_part_size > 0,
                Config,
                "Maximum part size must be greater than zero"
            );
            crate::ensure!(
                self.limits.safety_margin < self.limits.max_part_size,
                Config,
                "Safety margin ({} bytes) must be smaller than the maximum part size ({} bytes)",
                self.limits.safety_margin,
                self.limits.max_part_size
            );
        }

        Ok(())
    }

    /// Name prefixes of this tool's own reports about the target directory
    pub fn excluded_prefixes(&self) -> Vec<String> {
        [MAP_REPORT_PREFIX, SCAN_REPORT_PREFIX]
            .iter()
            .map(|prefix| report_stem(prefix, &self.target_dir))
            .collect()
    }
}
