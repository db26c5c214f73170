//! Core types for install targets.
//!
//! This module defines the foundational types used across the install
//! pipeline: digest algorithms, archive formats, existence probes, and the
//! static target definitions the catalog is built from.

use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// Digests
// ============================================================================

/// Hash algorithms a download can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Returns the conventional display name (`SHA-1`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }

    /// Length of the lowercase hex digest.
    pub fn hex_len(&self) -> usize {
        match self {
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An expected digest for a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedDigest {
    pub algorithm: DigestAlgorithm,
    /// Lowercase hex, compared case-sensitively.
    pub hex: &'static str,
}

impl ExpectedDigest {
    pub const fn sha1(hex: &'static str) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha1,
            hex,
        }
    }

    pub const fn sha256(hex: &'static str) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            hex,
        }
    }

    pub const fn sha512(hex: &'static str) -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha512,
            hex,
        }
    }
}

// ============================================================================
// Archive Format
// ============================================================================

/// Archive format for downloaded packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Tar archive; compression (none, gzip, bzip2, xz) is detected from the payload.
    Tar,
    /// ZIP archive.
    Zip,
}

impl ArchiveFormat {
    /// Infers the archive format from a URL or filename.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else if lower.ends_with(".tar")
            || lower.ends_with(".tar.gz")
            || lower.ends_with(".tgz")
            || lower.ends_with(".tar.bz2")
            || lower.ends_with(".tar.xz")
        {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

// ============================================================================
// Existence Probe
// ============================================================================

/// Which path marks a target as already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistenceProbe {
    /// The destination directory itself.
    DestinationDir,
    /// A file or directory below the destination, e.g. `bin/make.exe`.
    SubPath(&'static str),
}

impl ExistenceProbe {
    /// Resolves the probe against a destination directory.
    pub fn resolve(&self, destination: &Path) -> PathBuf {
        match self {
            Self::DestinationDir => destination.to_path_buf(),
            Self::SubPath(rel) => rel
                .split('/')
                .filter(|segment| !segment.is_empty())
                .fold(destination.to_path_buf(), |acc, segment| acc.join(segment)),
        }
    }
}

// ============================================================================
// Target Definition
// ============================================================================

/// Follow-up work run after a target's archives are in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInstall {
    None,
    /// Write `~/nano.rc` including every extracted `.nanorc` file.
    SyntaxIndex,
}

/// One downloadable archive that contributes to a target.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveSource {
    /// The download URL.
    pub url: &'static str,
    pub format: ArchiveFormat,
    /// Digests the payload must match. Empty means unverified.
    pub digests: &'static [ExpectedDigest],
    /// Overrides the target's probe for this archive.
    pub probe: Option<ExistenceProbe>,
}

/// Complete definition of an install target.
#[derive(Debug, Clone)]
pub struct InstallTarget {
    /// Unique name, e.g. `nano`.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Archives installed into the destination, in order.
    pub archives: &'static [ArchiveSource],
    /// Destination relative to the tooling root, `/`-separated.
    pub destination: &'static str,
    /// Leading member path segments to drop.
    pub strip_components: usize,
    /// Default existence probe for every archive of this target.
    pub probe: ExistenceProbe,
    /// Directory (relative to the destination) to put on PATH, if any.
    pub path_entry: Option<&'static str>,
    pub post_install: PostInstall,
}

impl InstallTarget {
    /// Resolves the destination directory under `root`.
    pub fn destination_dir(&self, root: &Path) -> PathBuf {
        join_relative(root, self.destination)
    }

    /// Resolves the PATH directory under `root`, if this target contributes one.
    pub fn path_dir(&self, root: &Path) -> Option<PathBuf> {
        self.path_entry
            .map(|rel| join_relative(&self.destination_dir(root), rel))
    }

    /// Returns the probe in effect for `source`.
    pub fn probe_for(&self, source: &ArchiveSource) -> ExistenceProbe {
        source.probe.unwrap_or(self.probe)
    }
}

/// Joins a `/`-separated relative path onto `base` using native separators.
pub(crate) fn join_relative(base: &Path, rel: &str) -> PathBuf {
    rel.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .fold(base.to_path_buf(), |acc, segment| acc.join(segment))
}
