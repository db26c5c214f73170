//! Runs the full installation sequence.
//!
//! Order of operations:
//!
//! 1. write the `nosetests` entry point into `{root}/bin`
//! 2. install every target, in catalog order, running post-install hooks
//! 3. look for an installed R
//! 4. write the PATH/EDITOR block into `~/.bash_profile`
//!
//! The first error aborts the run.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::install::{all_targets, Fetcher, InstallOutcome, InstallTarget, InstallationState, Installer, PostInstall};
use crate::layout::Layout;
use crate::profile::{update_profile, ProfileMode, ProfileUpdate};
use crate::report::Reporter;
use crate::rlang::{find_r_bin_dir, program_files_dirs};
use crate::scripts::create_nosetests_entry_point;
use crate::syntax::write_syntax_index;

// ============================================================================
// Summary
// ============================================================================

/// Outcomes for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub name: &'static str,
    pub outcomes: Vec<InstallOutcome>,
}

impl TargetReport {
    /// True if any archive of the target was fetched this run.
    pub fn changed(&self) -> bool {
        self.outcomes.iter().any(InstallOutcome::was_installed)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets: Vec<TargetReport>,
    /// Generated `nosetests` script.
    pub entry_point: PathBuf,
    /// `~/nano.rc`, if it was written this run.
    pub syntax_index: Option<PathBuf>,
    pub r_bin_dir: Option<PathBuf>,
    /// Directories appended to PATH, in order.
    pub path_entries: Vec<PathBuf>,
    pub profile: PathBuf,
    pub profile_update: ProfileUpdate,
}

impl RunSummary {
    /// Number of archives fetched and extracted.
    pub fn installed_archives(&self) -> usize {
        self.targets
            .iter()
            .flat_map(|t| t.outcomes.iter())
            .filter(|o| o.was_installed())
            .count()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Sequences one installation run.
pub struct Driver<'a> {
    layout: Layout,
    installer: Installer<'a>,
    reporter: &'a dyn Reporter,
    profile_mode: ProfileMode,
    r_search_dirs: Vec<PathBuf>,
}

impl<'a> Driver<'a> {
    /// Creates a driver with the default profile mode and R search disabled.
    pub fn new(
        layout: Layout,
        fetcher: &'a dyn Fetcher,
        state: &'a dyn InstallationState,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            layout,
            installer: Installer::new(fetcher, state, reporter),
            reporter,
            profile_mode: ProfileMode::default(),
            r_search_dirs: Vec::new(),
        }
    }

    pub fn with_profile_mode(mut self, mode: ProfileMode) -> Self {
        self.profile_mode = mode;
        self
    }

    /// Directories searched for `R/R-x.y.z/bin`. Empty disables the search.
    pub fn with_r_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.r_search_dirs = dirs;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Runs the sequence over `targets`.
    pub async fn run(&self, targets: &[InstallTarget]) -> Result<RunSummary> {
        let started_at = Utc::now();
        let root = self.layout.root();

        let entry_point = create_nosetests_entry_point(&self.layout.bin_dir(), self.reporter)?;

        let mut reports = Vec::with_capacity(targets.len());
        let mut syntax_index = None;
        for target in targets {
            let outcomes = self.installer.install_target(target, root).await?;
            if target.post_install == PostInstall::SyntaxIndex {
                let written = write_syntax_index(
                    &self.layout,
                    &target.destination_dir(root),
                    self.reporter,
                )
                .map_err(|e| e.in_target(target.name))?;
                syntax_index = syntax_index.or(written);
            }
            reports.push(TargetReport {
                name: target.name,
                outcomes,
            });
        }

        let r_bin_dir = if self.r_search_dirs.is_empty() {
            None
        } else {
            find_r_bin_dir(&self.r_search_dirs, self.reporter)
        };

        let path_entries = self.path_entries(targets, r_bin_dir.as_deref());
        let profile = self.layout.profile_path();
        let profile_update =
            update_profile(&profile, &path_entries, self.profile_mode, self.reporter)?;

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            targets: reports,
            entry_point,
            syntax_index,
            r_bin_dir,
            path_entries,
            profile,
            profile_update,
        })
    }

    /// Target PATH directories in catalog order, then the scripts dir, then R.
    fn path_entries(&self, targets: &[InstallTarget], r_bin_dir: Option<&Path>) -> Vec<PathBuf> {
        let root = self.layout.root();
        let mut entries: Vec<PathBuf> = targets.iter().filter_map(|t| t.path_dir(root)).collect();
        entries.push(self.layout.bin_dir());
        if let Some(r) = r_bin_dir {
            entries.push(r.to_path_buf());
        }
        entries
    }
}

/// Runs the built-in catalog with `settings`.
pub async fn run(
    settings: &Settings,
    fetcher: &dyn Fetcher,
    state: &dyn InstallationState,
    reporter: &dyn Reporter,
) -> Result<RunSummary> {
    let layout = settings.layout()?;
    let r_search_dirs = if settings.detect_r {
        program_files_dirs()
    } else {
        Vec::new()
    };

    Driver::new(layout, fetcher, state, reporter)
        .with_profile_mode(settings.profile_mode)
        .with_r_search_dirs(r_search_dirs)
        .run(all_targets())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::install::archive::tests::{build_tar_gz, build_zip};
    use crate::install::installer::tests::{leak_digest, MockFetcher};
    use crate::install::{ArchiveFormat, ArchiveSource, DigestAlgorithm, ExistenceProbe, FsInstallationState};
    use crate::report::{MemoryReporter, Severity, SilentReporter};
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn leak_sources(sources: Vec<ArchiveSource>) -> &'static [ArchiveSource] {
        Box::leak(sources.into_boxed_slice())
    }

    /// A small catalog shaped like the real one, served by `fetcher`.
    fn fixture_targets(fetcher: &MockFetcher) -> Vec<InstallTarget> {
        let make_bin = build_zip(&[("bin/make.exe", b"MZ make")]);
        let make_dep = build_zip(&[("bin/libiconv2.dll", b"MZ iconv")]);
        let nano = build_zip(&[("nano.exe", b"MZ nano")]);
        let nanorc = build_tar_gz(&[
            ("nanorc-2.3.6/", b""),
            ("nanorc-2.3.6/doc/syntax/python.nanorc", b"syntax \"python\""),
            ("nanorc-2.3.6/doc/syntax/c.nanorc", b"syntax \"c\""),
        ]);

        fetcher.serve("http://example.test/make-bin.zip", make_bin.clone());
        fetcher.serve("http://example.test/make-dep.zip", make_dep.clone());
        fetcher.serve("http://example.test/nano.zip", nano.clone());
        fetcher.serve("http://example.test/nanorc.tar.gz", nanorc.clone());

        vec![
            InstallTarget {
                name: "make",
                description: "GNU make",
                archives: leak_sources(vec![
                    ArchiveSource {
                        url: "http://example.test/make-bin.zip",
                        format: ArchiveFormat::Zip,
                        digests: Box::leak(
                            vec![leak_digest(DigestAlgorithm::Sha1, &make_bin)].into_boxed_slice(),
                        ),
                        probe: Some(ExistenceProbe::SubPath("bin/make.exe")),
                    },
                    ArchiveSource {
                        url: "http://example.test/make-dep.zip",
                        format: ArchiveFormat::Zip,
                        digests: Box::leak(
                            vec![leak_digest(DigestAlgorithm::Sha512, &make_dep)]
                                .into_boxed_slice(),
                        ),
                        probe: Some(ExistenceProbe::SubPath("bin/libiconv2.dll")),
                    },
                ]),
                destination: "opt/make",
                strip_components: 0,
                probe: ExistenceProbe::DestinationDir,
                path_entry: Some("bin"),
                post_install: PostInstall::None,
            },
            InstallTarget {
                name: "nano",
                description: "nano editor",
                archives: leak_sources(vec![ArchiveSource {
                    url: "http://example.test/nano.zip",
                    format: ArchiveFormat::Zip,
                    digests: Box::leak(
                        vec![leak_digest(DigestAlgorithm::Sha256, &nano)].into_boxed_slice(),
                    ),
                    probe: None,
                }]),
                destination: "opt/nano",
                strip_components: 0,
                probe: ExistenceProbe::DestinationDir,
                path_entry: Some(""),
                post_install: PostInstall::None,
            },
            InstallTarget {
                name: "nanorc",
                description: "nano syntax highlighting",
                archives: leak_sources(vec![ArchiveSource {
                    url: "http://example.test/nanorc.tar.gz",
                    format: ArchiveFormat::Tar,
                    digests: Box::leak(
                        vec![leak_digest(DigestAlgorithm::Sha1, &nanorc)].into_boxed_slice(),
                    ),
                    probe: None,
                }]),
                destination: "share/nanorc",
                strip_components: 1,
                probe: ExistenceProbe::DestinationDir,
                path_entry: None,
                post_install: PostInstall::SyntaxIndex,
            },
        ]
    }

    /// Relative path -> contents (`None` for directories) of everything under `dir`.
    fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Option<Vec<u8>>>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                let rel = path.strip_prefix(base).unwrap().to_path_buf();
                if path.is_dir() {
                    out.insert(rel, None);
                    walk(base, &path, out);
                } else {
                    out.insert(rel, Some(fs::read(&path).unwrap()));
                }
            }
        }
        let mut out = BTreeMap::new();
        walk(dir, dir, &mut out);
        out
    }

    #[tokio::test]
    async fn test_full_run_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new(temp_dir.path());
        let fetcher = MockFetcher::new();
        let targets = fixture_targets(&fetcher);
        let state = FsInstallationState;

        let driver = Driver::new(layout.clone(), &fetcher, &state, &SilentReporter);

        let first = driver.run(&targets).await.unwrap();
        assert_eq!(fetcher.calls(), 4);
        assert_eq!(first.installed_archives(), 4);
        assert!(first.targets.iter().all(TargetReport::changed));
        assert_eq!(first.syntax_index, Some(layout.nanorc_path()));
        assert_eq!(first.profile_update, ProfileUpdate::Appended);
        let tree_after_first = snapshot(temp_dir.path());

        let second = driver.run(&targets).await.unwrap();
        assert_eq!(fetcher.calls(), 4);
        assert_eq!(second.installed_archives(), 0);
        assert!(second.syntax_index.is_none());
        assert_eq!(second.profile_update, ProfileUpdate::Unchanged);
        assert_eq!(snapshot(temp_dir.path()), tree_after_first);
    }

    #[tokio::test]
    async fn test_run_produces_expected_layout() {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new(temp_dir.path());
        let fetcher = MockFetcher::new();
        let targets = fixture_targets(&fetcher);

        let summary = Driver::new(layout.clone(), &fetcher, &FsInstallationState, &SilentReporter)
            .run(&targets)
            .await
            .unwrap();

        let root = layout.root();
        assert!(root.join("opt/make/bin/make.exe").is_file());
        assert!(root.join("opt/make/bin/libiconv2.dll").is_file());
        assert!(root.join("opt/nano/nano.exe").is_file());
        assert!(root.join("share/nanorc/doc/syntax/c.nanorc").is_file());
        assert_eq!(summary.entry_point, layout.bin_dir().join("nosetests"));

        let nanorc = fs::read_to_string(layout.nanorc_path()).unwrap();
        assert_eq!(
            nanorc,
            "include ~/.swc/share/nanorc/doc/syntax/c.nanorc\n\
             include ~/.swc/share/nanorc/doc/syntax/python.nanorc\n"
        );
    }

    #[tokio::test]
    async fn test_path_entries_order_with_r() {
        let temp_dir = TempDir::new().unwrap();
        let home = temp_dir.path().join("home");
        let program_files = temp_dir.path().join("Program Files");
        let r_bin = program_files.join("R").join("R-3.2.1").join("bin");
        fs::create_dir_all(&r_bin).unwrap();

        let layout = Layout::new(&home);
        let fetcher = MockFetcher::new();
        let targets = fixture_targets(&fetcher);

        let summary = Driver::new(layout.clone(), &fetcher, &FsInstallationState, &SilentReporter)
            .with_r_search_dirs(vec![program_files])
            .run(&targets)
            .await
            .unwrap();

        let root = layout.root();
        assert_eq!(
            summary.path_entries,
            vec![
                root.join("opt").join("make").join("bin"),
                root.join("opt").join("nano"),
                layout.bin_dir(),
                r_bin.clone(),
            ]
        );
        assert_eq!(summary.r_bin_dir, Some(r_bin));

        let profile = fs::read_to_string(layout.profile_path()).unwrap();
        assert!(profile.contains("export EDITOR=nano"));
        assert!(profile.contains("R-3.2.1/bin"));
    }

    #[tokio::test]
    async fn test_first_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let layout = Layout::new(temp_dir.path());
        let fetcher = MockFetcher::new();
        let mut targets = fixture_targets(&fetcher);
        targets.insert(
            1,
            InstallTarget {
                name: "broken",
                description: "Not served",
                archives: leak_sources(vec![ArchiveSource {
                    url: "http://example.test/broken.zip",
                    format: ArchiveFormat::Zip,
                    digests: &[],
                    probe: None,
                }]),
                destination: "opt/broken",
                strip_components: 0,
                probe: ExistenceProbe::DestinationDir,
                path_entry: Some(""),
                post_install: PostInstall::None,
            },
        );

        let reporter = MemoryReporter::new(Severity::Debug);
        let err = Driver::new(layout.clone(), &fetcher, &FsInstallationState, &reporter)
            .run(&targets)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("broken"));
        assert!(layout.root().join("opt/make").is_dir());
        assert!(!layout.root().join("opt/nano").exists());
        assert!(!layout.profile_path().exists());
    }

    #[test]
    fn test_run_with_settings_requires_reachable_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            home_dir: Some(temp_dir.path().to_path_buf()),
            detect_r: false,
            ..Settings::default()
        };
        let fetcher = MockFetcher::new();

        let err = tokio_test::block_on(run(&settings, &fetcher, &FsInstallationState, &SilentReporter))
            .unwrap_err();

        assert_eq!(fetcher.calls(), 1);
        assert!(err.to_string().contains("make"));
        assert!(temp_dir.path().join(".swc/bin/nosetests").is_file());
    }
}
