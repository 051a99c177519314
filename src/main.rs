/*!
 * Command-line interface for dirreport
 */

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::error;

use dirreport::config::{Args, Config, ReportMode};
use dirreport::logging::init_logging;
use dirreport::mapper::StructureMapper;
use dirreport::report::{ReportFormat, Reporter, RunSummary};
use dirreport::scanner::Scanner;
use dirreport::utils::count_files;

fn main() -> ExitCode {
    // Parse command line arguments; a missing directory prints usage and exits non-zero
    let config = Config::from_args(Args::parse());
    init_logging(config.verbosity);

    match run(&config) {
        Ok(summary) => {
            Reporter::new(ReportFormat::ConsoleTable).print_report(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> dirreport::Result<RunSummary> {
    // Nothing is written unless the root and output directory are valid
    config.validate()?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Setup");
    progress.set_message(format!(
        "📂 Counting files in: {}",
        config.target_dir.display()
    ));

    let total_files = count_files(&config.target_dir, &config.excluded_prefixes());
    progress.set_length(total_files);

    let start_time = Instant::now();
    let progress = Arc::new(progress);

    let result = match config.mode {
        ReportMode::Map => {
            progress.set_prefix("🗺️ Mapping");
            StructureMapper::new(config.clone(), Arc::clone(&progress)).map()
        }
        ReportMode::Scan => {
            progress.set_prefix("📊 Scanning");
            Scanner::new(config.clone(), Arc::clone(&progress)).scan()
        }
    };

    progress.finish_and_clear();

    let mut summary = result?;
    summary.duration = start_time.elapsed();
    Ok(summary)
}
