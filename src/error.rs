//! Global error handling for dirreport
//!
//! Only two kinds of failure abort a run: an invalid scan root and a report
//! part that cannot be opened, written or closed. Per-file problems never
//! surface here; they are rendered into the report instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for dirreport operations
#[derive(Error, Debug)]
pub enum ReportError {
    /// File system errors not tied to a specific output part
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The scan target does not exist or is not a directory
    #[error("Invalid scan root: {0}")]
    InvalidRoot(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A report file could not be created, written or closed
    #[error("Failed to write report {}: {source}", path.display())]
    Output {
        /// Report file being written
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },
}

impl ReportError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReportError::Output {
            path: path.into(),
            source,
        }
    }
}

/// Specialized Result type for dirreport operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Creates a ReportError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ReportError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(value: i64) -> Result<i64> {
        crate::ensure!(value > 0, Config, "value must be positive, got {}", value);
        Ok(value)
    }

    #[test]
    fn ensure_builds_formatted_error() {
        let err = check_positive(-3).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: value must be positive, got -3");
        assert_eq!(check_positive(4).unwrap(), 4);
    }

    #[test]
    fn output_error_names_the_part() {
        let err = ReportError::output(
            "/tmp/report-part2.txt",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        let text = err.to_string();
        assert!(text.contains("report-part2.txt"));
        assert!(text.contains("disk full"));
    }
}
