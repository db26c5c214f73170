//! Error types for the install pipeline.
//!
//! Every failure carries enough context (URL, digests, path, target name) to be
//! diagnosed from the message alone. Nothing here is retried: errors propagate
//! to the driver, which halts the run.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while provisioning the tooling environment.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The network request could not complete (bad URL, DNS, connect, non-2xx, timeout).
    #[error("Failed to download {url}: {reason}")]
    Transport { url: String, reason: String },

    /// A downloaded payload did not hash to the declared digest.
    #[error("Downloaded {url} has the wrong {algorithm} hash: {actual} != {expected}")]
    Integrity {
        url: String,
        algorithm: String,
        expected: String,
        actual: String,
    },

    /// The payload could not be read as the declared archive format.
    #[error("Failed to read archive from {url}: {reason}")]
    Archive { url: String, reason: String },

    /// A filesystem operation on the host failed.
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The settings file could not be read or parsed.
    #[error("Invalid configuration at {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A failure inside a named catalog target.
    #[error("Failed to install {name}: {source}")]
    Target {
        name: String,
        #[source]
        source: Box<InstallError>,
    },
}

impl InstallError {
    /// Builds a `Filesystem` error for `path`.
    pub fn fs(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn transport(url: &str, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn archive(url: &str, reason: impl ToString) -> Self {
        Self::Archive {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Wraps this error with the name of the target being installed.
    pub fn in_target(self, name: &str) -> Self {
        Self::Target {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through `Target` wrappers.
    pub fn root(&self) -> &InstallError {
        match self {
            Self::Target { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result alias for the install pipeline.
pub type Result<T> = std::result::Result<T, InstallError>;
