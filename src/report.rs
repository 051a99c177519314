/*!
 * Reporting functionality for dirreport
 *
 * Renders the end-of-run summary printed to the console using the tabled
 * library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::format_file_size;

/// One report file produced by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// Part number (1 for the structure map)
    pub number: usize,
    /// Where the output was written
    pub location: String,
    /// Bytes written
    pub bytes: u64,
    /// Content blocks or map lines it holds
    pub items: usize,
}

/// Statistics for one run of either pipeline
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Scanned root as given
    pub root: String,
    /// Report files written, in order
    pub outputs: Vec<OutputInfo>,
    /// Time taken by the run
    pub duration: Duration,
    /// Directories visited, including the root
    pub directories: usize,
    /// Files visited
    pub files: usize,
    /// Per-category or per-kind file counts, in display order
    pub breakdown: Vec<(String, usize)>,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for run results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string for a finished run
    pub fn generate_report(&self, report: &RunSummary) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &RunSummary) {
        println!("\n{}", self.generate_report(report));
    }

    fn style(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    fn create_outputs_table(&self, report: &RunSummary) -> String {
        #[derive(Tabled)]
        struct OutputRow {
            #[tabled(rename = "Part")]
            number: usize,

            #[tabled(rename = "Report File")]
            location: String,

            #[tabled(rename = "Size")]
            size: String,

            #[tabled(rename = "Entries")]
            items: String,
        }

        let rows: Vec<OutputRow> = report
            .outputs
            .iter()
            .map(|output| OutputRow {
                number: output.number,
                location: output.location.clone(),
                size: format_file_size(output.bytes),
                items: self.format_number(output.items),
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    fn create_summary_table(&self, report: &RunSummary) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Root".to_string(),
                value: report.root.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "🗂️ Directories".to_string(),
                value: self.format_number(report.directories),
            },
            SummaryRow {
                key: "📄 Files".to_string(),
                value: self.format_number(report.files),
            },
        ];

        rows.extend(
            report
                .breakdown
                .iter()
                .filter(|(_, count)| *count > 0)
                .map(|(label, count)| SummaryRow {
                    key: format!("   {}", label),
                    value: self.format_number(*count),
                }),
        );

        Self::style(&mut Table::new(rows))
    }

    fn generate_console_report(&self, report: &RunSummary) -> String {
        let outputs_title = if report.outputs.len() > 1 {
            format!("📋  REPORT WRITTEN IN {} PARTS", report.outputs.len())
        } else {
            "📋  REPORT WRITTEN".to_string()
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            outputs_title,
            self.create_outputs_table(report),
            "✅  RUN COMPLETE",
            self.create_summary_table(report)
        )
    }
}
