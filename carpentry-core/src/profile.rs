//! Shell profile configuration.
//!
//! Adds the installed tools to `PATH` and makes nano the default editor by
//! writing a block into `~/.bash_profile`:
//!
//! ```bash
//! # Add paths for Software-Carpentry-installed scripts and executables
//! export PATH="$PATH:/c/Users/ada/.swc/opt/make/bin:/c/Users/ada/.swc/opt/nano"
//!
//! # Make nano the default editor
//! export EDITOR=nano
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::layout::make_posix_path;
use crate::report::Reporter;

/// Opening marker of a managed block.
pub const BLOCK_BEGIN: &str = "# >>> software carpentry installer >>>";
/// Closing marker of a managed block.
pub const BLOCK_END: &str = "# <<< software carpentry installer <<<";

// ============================================================================
// Mode
// ============================================================================

/// How the block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    /// Append every run. Reruns duplicate the block.
    Append,
    /// Keep one block between markers, replacing it on reruns.
    #[default]
    Replace,
}

impl ProfileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for ProfileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProfileMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            _ => Err(format!("Unknown profile mode: {}", s)),
        }
    }
}

/// What happened to the profile file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileUpdate {
    Appended,
    Replaced,
    Unchanged,
}

// ============================================================================
// Block Rendering
// ============================================================================

fn escape_for_double_quotes(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('$', "\\$")
        .replace('`', "\\`")
        .replace('"', "\\\"")
}

/// Renders the PATH/EDITOR lines, without markers.
pub fn render_block(extra_paths: &[PathBuf]) -> String {
    let joined = extra_paths
        .iter()
        .map(|p| escape_for_double_quotes(&make_posix_path(&p.to_string_lossy())))
        .collect::<Vec<_>>()
        .join(":");
    let path_line = format!("export PATH=\"$PATH:{}\"", joined);

    [
        "# Add paths for Software-Carpentry-installed scripts and executables",
        path_line.as_str(),
        "",
        "# Make nano the default editor",
        "export EDITOR=nano",
    ]
    .join("\n")
}

/// Replaces the managed block in `existing`, or appends one.
pub fn splice_block(existing: &str, block: &str) -> String {
    let managed = format!("{}\n{}\n{}\n", BLOCK_BEGIN, block, BLOCK_END);

    if let Some(begin) = existing.find(BLOCK_BEGIN) {
        if let Some(end_rel) = existing[begin..].find(BLOCK_END) {
            let mut end = begin + end_rel + BLOCK_END.len();
            if existing[end..].starts_with('\n') {
                end += 1;
            }
            return format!("{}{}{}", &existing[..begin], managed, &existing[end..]);
        }
    }

    let mut out = existing.to_string();
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(&managed);
    out
}

// ============================================================================
// Profile Update
// ============================================================================

/// Writes the PATH/EDITOR block into the profile at `profile_path`.
pub fn update_profile(
    profile_path: &Path,
    extra_paths: &[PathBuf],
    mode: ProfileMode,
    reporter: &dyn Reporter,
) -> Result<ProfileUpdate> {
    reporter.info(&format!("update bash profile at {}", profile_path.display()));
    reporter.debug(&format!(
        "extra paths:\n* {}",
        extra_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n* ")
    ));

    let block = render_block(extra_paths);

    match mode {
        ProfileMode::Append => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(profile_path)
                .map_err(|e| InstallError::fs(profile_path, e))?;
            write!(file, "\n{}\n", block).map_err(|e| InstallError::fs(profile_path, e))?;
            Ok(ProfileUpdate::Appended)
        }
        ProfileMode::Replace => {
            let existing = match fs::read_to_string(profile_path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(InstallError::fs(profile_path, e)),
            };

            let updated = splice_block(&existing, &block);
            if updated == existing {
                return Ok(ProfileUpdate::Unchanged);
            }

            let had_block = existing.contains(BLOCK_BEGIN);
            fs::write(profile_path, updated).map_err(|e| InstallError::fs(profile_path, e))?;
            Ok(if had_block {
                ProfileUpdate::Replaced
            } else {
                ProfileUpdate::Appended
            })
        }
    }
}
