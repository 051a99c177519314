/*!
 * Utility functions for dirreport
 */

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use chrono::{DateTime, Local};

use crate::walker::Walker;

/// Count files under `dir` for progress tracking, skipping the given name prefixes
pub fn count_files(dir: &Path, excluded_prefixes: &[String]) -> u64 {
    Walker::new(dir)
        .exclude_prefixes(excluded_prefixes.iter().cloned())
        .filter(|entry| !entry.is_dir)
        .count() as u64
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where one exists. The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `/..` is `/`
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Turn a scan root into a string safe to embed in a report file name.
///
/// Separators become `-`, leading and trailing `-` are stripped and anything
/// that is not alphanumeric, `-` or `_` becomes `_`.
pub fn sanitize_root_name(path: &Path) -> String {
    let normalized = normalize_path(path).to_string_lossy().to_string();
    let dashed: String = normalized
        .chars()
        .map(|c| if c == MAIN_SEPARATOR || c == '/' { '-' } else { c })
        .collect();

    dashed
        .trim_matches('-')
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Shared stem for every report of one kind about one root, without the timestamp.
///
/// Ends with `-` so it doubles as the walker's exclusion prefix.
pub fn report_stem(prefix: &str, root: &Path) -> String {
    format!("{}-{}-", prefix, sanitize_root_name(root))
}

/// Timestamp used in report file names (`YYYYMMDD_HHMMSS`)
pub fn file_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Timestamp used inside report headers (`YYYY-MM-DD HH:MM:SS`)
pub fn header_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_sizes_with_units() {
        assert_eq!(format_file_size(10), "10 bytes");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(185 * 1024 * 1024), "185.00 MB");
    }

    #[test]
    fn normalizes_dots_and_trailing_separators() {
        assert_eq!(normalize_path(Path::new("a/./b/")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_path(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[cfg(unix)]
    #[test]
    fn sanitizes_root_names() {
        assert_eq!(sanitize_root_name(Path::new("/home/user/my project")), "home-user-my_project");
        assert_eq!(sanitize_root_name(Path::new("web/app/")), "web-app");
        assert_eq!(sanitize_root_name(Path::new("src.v2")), "src_v2");
        assert_eq!(sanitize_root_name(Path::new(".")), "_");
        assert_eq!(sanitize_root_name(Path::new("projét")), "projét");
    }

    #[test]
    fn report_stem_ends_with_dash() {
        assert_eq!(report_stem("scan-report", Path::new("demo")), "scan-report-demo-");
    }

    #[test]
    fn timestamps_use_fixed_layouts() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(file_timestamp(&now), "20240309_070501");
        assert_eq!(header_timestamp(&now), "2024-03-09 07:05:01");
    }
}
