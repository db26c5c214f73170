//! Idempotent archive installation.
//!
//! The `Installer` is the main entry point of the pipeline. It coordinates the
//! installation-state probe, the fetcher, the archive readers and the
//! normalizer. Nothing touches the filesystem until the payload has been
//! verified and parsed.

use std::fs;
use std::path::{Path, PathBuf};

use super::archive::{member_destination, ArchiveMember, ArchiveReader, MemberKind, TarReader, ZipReader};
use super::fetcher::{download, Fetcher};
use super::normalize::normalize_member;
use super::state::InstallationState;
use super::types::{ArchiveFormat, ArchiveSource, ExistenceProbe, InstallTarget};
use crate::error::{InstallError, Result};
use crate::report::Reporter;

// ============================================================================
// Outcome
// ============================================================================

/// What an install call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The archive was fetched and extracted.
    Installed {
        destination: PathBuf,
        /// Members written (files and directories).
        members: usize,
        /// Size of the downloaded payload.
        bytes: u64,
    },
    /// The existence probe was already present; nothing was done.
    AlreadyPresent { probe: PathBuf },
}

impl InstallOutcome {
    pub fn was_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }
}

// ============================================================================
// Installer
// ============================================================================

/// Installs archives into destination directories, once.
pub struct Installer<'a> {
    fetcher: &'a dyn Fetcher,
    state: &'a dyn InstallationState,
    reporter: &'a dyn Reporter,
}

impl<'a> Installer<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        state: &'a dyn InstallationState,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            fetcher,
            state,
            reporter,
        }
    }

    /// Installs every archive of `target` under `root`, in order.
    ///
    /// Errors are wrapped with the target name.
    pub async fn install_target(
        &self,
        target: &InstallTarget,
        root: &Path,
    ) -> Result<Vec<InstallOutcome>> {
        let destination = target.destination_dir(root);
        self.reporter
            .debug(&format!("target {}: {}", target.name, target.description));
        let mut outcomes = Vec::with_capacity(target.archives.len());

        for source in target.archives {
            let outcome = self
                .install_archive(
                    source,
                    &destination,
                    target.strip_components,
                    target.probe_for(source),
                )
                .await
                .map_err(|e| e.in_target(target.name))?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Ensures the contents of `source` exist, verified, under `destination`.
    ///
    /// # Errors
    ///
    /// - `Transport` / `Integrity` from the fetch; the filesystem is untouched.
    /// - `Archive` if the payload cannot be parsed; no directory is created.
    /// - `Filesystem` if the destination cannot be written.
    pub async fn install_archive(
        &self,
        source: &ArchiveSource,
        destination: &Path,
        strip_components: usize,
        probe: ExistenceProbe,
    ) -> Result<InstallOutcome> {
        match source.format {
            ArchiveFormat::Tar => {
                self.install_with::<TarReader>(source, destination, strip_components, probe)
                    .await
            }
            ArchiveFormat::Zip => {
                self.install_with::<ZipReader>(source, destination, strip_components, probe)
                    .await
            }
        }
    }

    async fn install_with<R: ArchiveReader>(
        &self,
        source: &ArchiveSource,
        destination: &Path,
        strip_components: usize,
        probe: ExistenceProbe,
    ) -> Result<InstallOutcome> {
        let probe_path = probe.resolve(destination);
        if self.state.is_installed(&probe_path) {
            self.reporter.info(&format!(
                "existing installation at {}",
                destination.display()
            ));
            return Ok(InstallOutcome::AlreadyPresent { probe: probe_path });
        }

        let artifact = download(self.fetcher, source.url, source.digests, self.reporter).await?;
        let bytes = artifact.bytes.len() as u64;

        let mut reader = R::open(artifact)?;
        let plan: Vec<ArchiveMember> = reader
            .members()
            .iter()
            .cloned()
            .filter_map(|member| self.plan_member(member, strip_components, destination))
            .collect();

        self.reporter.info(&format!(
            "installing {} into {}",
            source.url,
            destination.display()
        ));
        create_destination(destination)?;

        for member in &plan {
            reader.extract_member(member, destination)?;
        }

        self.reporter.debug(&format!(
            "extracted {} members into {}",
            plan.len(),
            destination.display()
        ));

        Ok(InstallOutcome::Installed {
            destination: destination.to_path_buf(),
            members: plan.len(),
            bytes,
        })
    }

    /// Normalizes a member and decides whether it gets extracted.
    fn plan_member(
        &self,
        member: ArchiveMember,
        strip_components: usize,
        destination: &Path,
    ) -> Option<ArchiveMember> {
        let original = member.path.clone();
        let member = normalize_member(member, strip_components)?;

        match member.kind {
            MemberKind::Link => {
                self.reporter
                    .warn(&format!("skipping link member {}", original));
                None
            }
            MemberKind::Other => {
                self.reporter
                    .debug(&format!("skipping special member {}", original));
                None
            }
            MemberKind::File | MemberKind::Directory => {
                if member_destination(destination, &member.path).is_none() {
                    self.reporter
                        .warn(&format!("skipping unsafe member path {}", original));
                    return None;
                }
                Some(member)
            }
        }
    }
}

/// Creates the destination directory. An existing directory is fine.
fn create_destination(destination: &Path) -> Result<()> {
    match fs::create_dir_all(destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && destination.is_dir() => Ok(()),
        Err(e) => Err(InstallError::fs(destination, e)),
    }
}
