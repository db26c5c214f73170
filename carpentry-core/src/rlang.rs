//! Locating an installed R.
//!
//! R installs into `<Program Files>/R/R-<major>.<minor>.<patch>/`. When several
//! versions are present the newest one's `bin` directory is used.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::report::Reporter;

/// Program Files locations to search, with Windows defaults.
const PROGRAM_FILES_VARS: &[(&str, &str)] = &[
    ("ProgramW6432", r"c:\Program Files"),
    ("ProgramFiles", r"c:\Program Files"),
    ("ProgramFiles(x86)", r"c:\Program Files(x86)"),
];

/// Returns the Program Files directories from the environment.
pub fn program_files_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for (var, default) in PROGRAM_FILES_VARS {
        let dir = PathBuf::from(std::env::var(var).unwrap_or_else(|_| default.to_string()));
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Parses `R-3.2.1` into `(3, 2, 1)`.
pub fn parse_r_version(dir_name: &str) -> Option<(u32, u32, u32)> {
    let version_re = Regex::new(r"^R-(\d+)\.(\d+)\.(\d+)$").ok()?;
    let caps = version_re.captures(dir_name)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

fn candidate_bins(program_dir: &Path) -> Vec<PathBuf> {
    let pattern = format!(
        "{}/R/R-*/bin",
        glob::Pattern::escape(&program_dir.to_string_lossy())
    );
    match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(|p| p.ok()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Finds the newest R `bin` directory under any of `program_dirs`.
///
/// The first directory found for a given version wins.
pub fn find_r_bin_dir(program_dirs: &[PathBuf], reporter: &dyn Reporter) -> Option<PathBuf> {
    let mut found: BTreeMap<(u32, u32, u32), PathBuf> = BTreeMap::new();

    for program_dir in program_dirs {
        for bin in candidate_bins(program_dir) {
            let version = bin
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .and_then(parse_r_version);
            if let Some(version) = version {
                found.entry(version).or_insert(bin);
            }
        }
    }

    let Some((version, path)) = found.iter().next_back() else {
        reporter.info(&format!(
            "no R installation found under {}",
            program_dirs
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        return None;
    };

    reporter.debug(&format!(
        "detected R installs:\n* {}",
        found
            .values()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n* ")
    ));
    reporter.info(&format!(
        "using R v{}.{}.{} bin directory at {}",
        version.0,
        version.1,
        version.2,
        path.display()
    ));
    Some(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryReporter, Severity, SilentReporter};
    use std::fs;
    use tempfile::TempDir;

    fn make_r(program_dir: &Path, version_dir: &str) -> PathBuf {
        let bin = program_dir.join("R").join(version_dir).join("bin");
        fs::create_dir_all(&bin).unwrap();
        bin
    }

    #[test]
    fn test_parse_r_version() {
        assert_eq!(parse_r_version("R-3.2.1"), Some((3, 2, 1)));
        assert_eq!(parse_r_version("R-10.0.12"), Some((10, 0, 12)));
        assert_eq!(parse_r_version("R-3.2.1patched"), None);
        assert_eq!(parse_r_version("R-3.2"), None);
        assert_eq!(parse_r_version("Rtools"), None);
    }

    #[test]
    fn test_picks_newest_version_numerically() {
        let temp_dir = TempDir::new().unwrap();
        let pf = temp_dir.path().join("Program Files");
        make_r(&pf, "R-3.9.0");
        let newest = make_r(&pf, "R-3.10.2");
        make_r(&pf, "R-3.11.0beta");

        let reporter = MemoryReporter::new(Severity::Info);
        let found = find_r_bin_dir(&[pf], &reporter).unwrap();
        assert_eq!(found, newest);
        assert!(reporter.contains("using R v3.10.2"));
    }

    #[test]
    fn test_first_program_dir_wins_per_version() {
        let temp_dir = TempDir::new().unwrap();
        let pf64 = temp_dir.path().join("pf64");
        let pf32 = temp_dir.path().join("pf32");
        let first = make_r(&pf64, "R-3.2.1");
        make_r(&pf32, "R-3.2.1");

        let found = find_r_bin_dir(&[pf64, pf32], &SilentReporter).unwrap();
        assert_eq!(found, first);
    }

    #[test]
    fn test_no_r_installed() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = MemoryReporter::new(Severity::Info);
        assert!(find_r_bin_dir(&[temp_dir.path().to_path_buf()], &reporter).is_none());
        assert!(reporter.contains("no R installation found"));
    }

    #[test]
    fn test_program_files_dirs_are_deduplicated() {
        let dirs = program_files_dirs();
        assert!(!dirs.is_empty());
        for (i, dir) in dirs.iter().enumerate() {
            assert!(!dirs[i + 1..].contains(dir));
        }
    }
}
