//! Installer settings.
//!
//! Settings are read from an optional JSON file; command-line flags override
//! individual fields afterwards.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{InstallError, Result};
use crate::layout::{Layout, TOOLING_DIR};
use crate::profile::ProfileMode;
use crate::report::Severity;

/// Name of the settings file inside the tooling root.
pub const SETTINGS_FILE: &str = "settings.json";

/// Upper bound for the request timeout, in seconds.
const MAX_TIMEOUT_SECS: u64 = 3600;

// =============================================================================
// Settings
// =============================================================================

/// Installer settings - persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tooling root. Defaults to `~/.swc`.
    pub root_dir: Option<PathBuf>,

    /// Home directory holding the profile and `nano.rc`. Defaults to the user's home.
    pub home_dir: Option<PathBuf>,

    /// How `~/.bash_profile` is updated.
    pub profile_mode: ProfileMode,

    /// Per-request download timeout. `None` uses the transport default.
    pub timeout_secs: Option<u64>,

    /// Minimum severity that gets logged.
    pub verbosity: Severity,

    /// Look for an installed R and add it to PATH.
    pub detect_r: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_dir: None,
            home_dir: None,
            profile_mode: ProfileMode::default(),
            timeout_secs: None,
            verbosity: Severity::default(),
            detect_r: true,
        }
    }
}

impl Settings {
    /// Default settings file location: `~/.swc/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(TOOLING_DIR).join(SETTINGS_FILE))
    }

    /// Loads settings from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Settings not found at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(InstallError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        };

        let mut settings: Settings =
            serde_json::from_str(&json).map_err(|e| InstallError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        settings.validate();
        Ok(settings)
    }

    /// Saves settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::fs(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| InstallError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, json).map_err(|e| InstallError::fs(path, e))?;
        Ok(())
    }

    /// Clamps values to supported ranges.
    pub fn validate(&mut self) {
        self.timeout_secs = match self.timeout_secs {
            Some(0) | None => None,
            Some(secs) => Some(secs.min(MAX_TIMEOUT_SECS)),
        };
    }

    /// The request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolves the filesystem layout for this run.
    ///
    /// # Errors
    ///
    /// Returns `Config` if no home directory is configured and none can be found.
    pub fn layout(&self) -> Result<Layout> {
        let home = match &self.home_dir {
            Some(home) => home.clone(),
            None => dirs::home_dir().ok_or_else(|| InstallError::Config {
                path: PathBuf::from("~"),
                reason: "cannot determine the home directory".to_string(),
            })?,
        };

        let layout = Layout::new(home);
        Ok(match &self.root_dir {
            Some(root) => layout.with_root(root.clone()),
            None => layout,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
