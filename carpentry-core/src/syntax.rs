//! nano syntax-highlighting index.
//!
//! After the syntax configs are extracted, `~/nano.rc` gets one `include` line
//! per `.nanorc` file so nano picks them up. An existing `nano.rc` is left
//! alone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{InstallError, Result};
use crate::layout::{make_posix_path, Layout};
use crate::report::Reporter;

/// Where the syntax files sit inside the extracted nano sources.
pub const SYNTAX_SUBDIR: &str = "doc/syntax";

/// Builds the `include` line for one syntax file, relative to `home`.
pub fn include_line(path: &Path, home: &Path) -> String {
    let include_path = match pathdiff::diff_paths(path, home) {
        Some(rel) => format!("~/{}", rel.display()),
        None => path.display().to_string(),
    };
    format!("include {}", make_posix_path(&include_path))
}

/// Lists `*.nanorc` files in `syntax_dir`, sorted by name.
pub fn syntax_files(syntax_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(syntax_dir).map_err(|e| InstallError::fs(syntax_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| InstallError::fs(syntax_dir, e))?;
        let path = entry.path();
        let is_nanorc = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".nanorc"));
        if is_nanorc {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Writes `~/nano.rc` unless it already exists.
///
/// Returns the path written, or `None` if an existing file was kept.
pub fn write_syntax_index(
    layout: &Layout,
    install_dir: &Path,
    reporter: &dyn Reporter,
) -> Result<Option<PathBuf>> {
    let nanorc = layout.nanorc_path();
    if nanorc.is_file() {
        reporter.debug(&format!("keeping existing {}", nanorc.display()));
        return Ok(None);
    }

    let syntax_dir = SYNTAX_SUBDIR
        .split('/')
        .fold(install_dir.to_path_buf(), |acc, s| acc.join(s));
    reporter.info(&format!(
        "include nanorc from {} in {}",
        syntax_dir.display(),
        nanorc.display()
    ));

    let mut contents = String::new();
    for file in syntax_files(&syntax_dir)? {
        contents.push_str(&include_line(&file, layout.home()));
        contents.push('\n');
    }

    fs::write(&nanorc, contents).map_err(|e| InstallError::fs(&nanorc, e))?;
    Ok(Some(nanorc))
}
