//! Installation-state probes.
//!
//! The installer asks an [`InstallationState`] whether a target's existence
//! probe is already present before doing anything with side effects.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Answers "is this probe path already on disk?".
pub trait InstallationState: Send + Sync {
    fn is_installed(&self, probe: &Path) -> bool;
}

/// Checks the real filesystem. Files and directories both count.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsInstallationState;

impl InstallationState for FsInstallationState {
    fn is_installed(&self, probe: &Path) -> bool {
        probe.exists()
    }
}

/// In-memory state for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryInstallationState {
    present: Mutex<HashSet<PathBuf>>,
}

impl MemoryInstallationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a probe path as present.
    pub fn mark(&self, probe: impl Into<PathBuf>) {
        let mut present = match self.present.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        present.insert(probe.into());
    }
}

impl InstallationState for MemoryInstallationState {
    fn is_installed(&self, probe: &Path) -> bool {
        match self.present.lock() {
            Ok(present) => present.contains(probe),
            Err(poisoned) => poisoned.into_inner().contains(probe),
        }
    }
}
