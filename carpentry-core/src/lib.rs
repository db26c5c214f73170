//! Carpentry Core Library
//!
//! This crate provisions a *nix-style tooling environment for Software
//! Carpentry workshops on Windows hosts. It includes:
//!
//! - Verified downloads (SHA-1 / SHA-256 / SHA-512 digests)
//! - Tar and zip extraction with leading-component stripping
//! - Idempotent installs driven by existence probes
//! - The static catalog of tools (make, nano, nanorc, sqlite)
//! - nano syntax index, `nosetests` entry point and R discovery
//! - `~/.bash_profile` PATH/EDITOR configuration
//! - Settings and severity-filtered reporting

pub mod config;
pub mod driver;
pub mod error;
pub mod install;
pub mod layout;
pub mod profile;
pub mod report;
pub mod rlang;
pub mod scripts;
pub mod syntax;

// Re-exports for convenience
pub use config::Settings;
pub use error::{InstallError, Result};
pub use layout::{make_posix_path, Layout};

// Re-export the pipeline
pub use driver::{run, Driver, RunSummary, TargetReport};
pub use install::{
    all_targets, find_target, Fetcher, FsInstallationState, HttpFetcher, InstallOutcome,
    InstallTarget, InstallationState, Installer,
};

// Re-export reporting
pub use report::{MemoryReporter, Reporter, Severity, SilentReporter, TracingReporter};

// Re-export profile configuration
pub use profile::{update_profile, ProfileMode, ProfileUpdate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
