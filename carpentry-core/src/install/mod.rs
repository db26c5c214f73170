//! Verified download-and-install pipeline.
//!
//! # Architecture
//!
//! - `types`: Core types (InstallTarget, ArchiveSource, ExpectedDigest, ExistenceProbe)
//! - `catalog`: Static target definitions with download URLs and digests
//! - `fetcher`: HTTP retrieval plus digest verification
//! - `normalize`: Archive member path rewriting (strip components)
//! - `archive`: Tar and zip readers behind one trait
//! - `state`: Installation-state probes
//! - `installer`: Idempotent fetch → verify → extract
//!
//! # Example
//!
//! ```ignore
//! use carpentry_core::install::{find_target, FsInstallationState, HttpFetcher, Installer};
//! use carpentry_core::report::{Severity, TracingReporter};
//!
//! let fetcher = HttpFetcher::new();
//! let reporter = TracingReporter::new(Severity::Info);
//! let installer = Installer::new(&fetcher, &FsInstallationState, &reporter);
//!
//! let nano = find_target("nano").unwrap();
//! installer.install_target(nano, &root).await?;
//! ```

pub mod archive;
pub mod catalog;
pub mod fetcher;
pub mod installer;
pub mod normalize;
pub mod state;
pub mod types;

pub use archive::{ArchiveMember, ArchiveReader, MemberKind, TarCompression, TarReader, ZipReader};
pub use catalog::{all_targets, find_target};
pub use fetcher::{
    compute_digest, download, verify_digests, DownloadedArtifact, Fetcher, HttpFetcher,
};
pub use installer::{InstallOutcome, Installer};
pub use normalize::{normalize_member, normalize_path, split_components};
pub use state::{FsInstallationState, InstallationState, MemoryInstallationState};
pub use types::{
    ArchiveFormat, ArchiveSource, DigestAlgorithm, ExistenceProbe, ExpectedDigest, InstallTarget,
    PostInstall,
};
