//! Filesystem layout of the tooling environment.
//!
//! Everything is installed below the tooling root, by default `~/.swc/`:
//!
//! - `~/.swc/bin/`: generated scripts (`nosetests`)
//! - `~/.swc/opt/<tool>/`: one directory per installed tool
//! - `~/.swc/share/nanorc/`: syntax-highlighting configs
//!
//! The user's profile (`~/.bash_profile`) and nano config (`~/nano.rc`) live
//! directly in the home directory.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Name of the tooling root under the home directory.
pub const TOOLING_DIR: &str = ".swc";

/// Resolved paths for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home: PathBuf,
    root: PathBuf,
}

impl Layout {
    /// Builds a layout with the default root `<home>/.swc`.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let root = home.join(TOOLING_DIR);
        Self { home, root }
    }

    /// Overrides the tooling root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding generated scripts.
    ///
    /// Path: `{root}/bin/`
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Path: `{home}/.bash_profile`
    pub fn profile_path(&self) -> PathBuf {
        self.home.join(".bash_profile")
    }

    /// Path: `{home}/nano.rc`
    pub fn nanorc_path(&self) -> PathBuf {
        self.home.join("nano.rc")
    }
}

/// Converts a Windows path to the form msysGit's bash understands.
///
/// Backslashes become slashes and a leading `C:` becomes `/c`.
pub fn make_posix_path(windows_path: &str) -> String {
    static DRIVE: OnceLock<Regex> = OnceLock::new();
    let drive = DRIVE.get_or_init(|| Regex::new(r"^[Cc]:").expect("static regex"));

    let slashed = windows_path.replace('\\', "/");
    drive.replace(&slashed, "/c").into_owned()
}
