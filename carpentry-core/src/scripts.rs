//! Generated entry-point scripts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::report::Reporter;

/// Shim that makes nose runnable as a plain `nosetests` command in msysGit.
pub const NOSETESTS_SCRIPT: &str = "#!/usr/bin/env/ python
import sys
import nose
if __name__ == '__main__':
    sys.exit(nose.core.main())
";

/// Writes `nosetests` into `scripts_dir`.
///
/// The directory is only created when it is missing; the script itself is
/// rewritten on every run.
pub fn create_nosetests_entry_point(scripts_dir: &Path, reporter: &dyn Reporter) -> Result<PathBuf> {
    if !scripts_dir.is_dir() {
        fs::create_dir_all(scripts_dir).map_err(|e| InstallError::fs(scripts_dir, e))?;
    }

    let path = scripts_dir.join("nosetests");
    reporter.info(&format!("create nosetests entrypoint {}", path.display()));
    fs::write(&path, NOSETESTS_SCRIPT).map_err(|e| InstallError::fs(&path, e))?;
    Ok(path)
}
