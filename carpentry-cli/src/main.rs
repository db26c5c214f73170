//! Carpentry Installer
//!
//! Installs make, nano, nano syntax highlighting and sqlite into `~/.swc` and
//! configures `~/.bash_profile` for Software Carpentry workshops.

use anyhow::{Context, Result};
use carpentry_core::{
    run, FsInstallationState, HttpFetcher, ProfileMode, Settings, Severity, TracingReporter,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log levels accepted by `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl From<Verbosity> for Severity {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Critical => Severity::Critical,
            Verbosity::Error => Severity::Error,
            Verbosity::Warning => Severity::Warning,
            Verbosity::Info => Severity::Info,
            Verbosity::Debug => Severity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileModeArg {
    Append,
    Replace,
}

impl From<ProfileModeArg> for ProfileMode {
    fn from(mode: ProfileModeArg) -> Self {
        match mode {
            ProfileModeArg::Append => ProfileMode::Append,
            ProfileModeArg::Replace => ProfileMode::Replace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "carpentry-installer", version, about)]
struct Cli {
    /// Verbosity (default: info, or the settings file value)
    #[arg(short, long, value_enum)]
    verbose: Option<Verbosity>,

    /// Tooling root (default: ~/.swc)
    #[arg(long, env = "SWC_ROOT")]
    root: Option<PathBuf>,

    /// Home directory holding .bash_profile and nano.rc
    #[arg(long)]
    home: Option<PathBuf>,

    /// How ~/.bash_profile is updated
    #[arg(long, value_enum)]
    profile_mode: Option<ProfileModeArg>,

    /// Settings file (default: ~/.swc/settings.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-download timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Skip looking for an installed R
    #[arg(long)]
    no_r: bool,
}

impl Cli {
    /// Loads the settings file and applies command-line overrides.
    fn settings(&self) -> Result<Settings> {
        let path = self.config.clone().or_else(Settings::default_path);
        let mut settings = match &path {
            Some(path) => Settings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(verbose) = self.verbose {
            settings.verbosity = verbose.into();
        }
        if let Some(root) = &self.root {
            settings.root_dir = Some(root.clone());
        }
        if let Some(home) = &self.home {
            settings.home_dir = Some(home.clone());
        }
        if let Some(mode) = self.profile_mode {
            settings.profile_mode = mode.into();
        }
        if self.timeout_secs.is_some() {
            settings.timeout_secs = self.timeout_secs;
        }
        if self.no_r {
            settings.detect_r = false;
        }
        settings.validate();
        Ok(settings)
    }
}

fn init_logging(verbosity: Severity) -> Result<()> {
    let level = verbosity.tracing_level();
    let directive: tracing_subscriber::filter::Directive = format!("carpentry={}", level)
        .parse()
        .context("Invalid log directive")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive)
                .add_directive(level.into()),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings()?;

    init_logging(settings.verbosity)?;
    let reporter = TracingReporter::new(settings.verbosity);

    tracing::info!(target: "carpentry", "Preparing your Software Carpentry awesomeness!");
    tracing::info!(target: "carpentry", "installer version {}", carpentry_core::VERSION);

    let fetcher = HttpFetcher::new().with_timeout(settings.timeout());

    // One target at a time; nothing here needs a thread pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let summary = runtime
        .block_on(run(&settings, &fetcher, &FsInstallationState, &reporter))
        .context("Installation failed")?;

    tracing::debug!(
        target: "carpentry",
        installed = summary.installed_archives(),
        elapsed_ms = summary.duration().num_milliseconds(),
        "run finished"
    );
    tracing::info!(target: "carpentry", "Installation complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "carpentry-installer",
            "-v",
            "debug",
            "--root",
            "/srv/swc",
            "--profile-mode",
            "append",
            "--timeout-secs",
            "30",
            "--no-r",
        ]);
        assert_eq!(cli.verbose, Some(Verbosity::Debug));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/swc")));
        assert_eq!(cli.profile_mode, Some(ProfileModeArg::Append));
        assert_eq!(cli.timeout_secs, Some(30));
        assert!(cli.no_r);
    }

    #[test]
    fn test_cli_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["carpentry-installer", "--verbose", "loud"]).is_err());
    }

    #[test]
    fn test_cli_overrides_settings_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = temp_dir.path().join("settings.json");
        Settings {
            profile_mode: ProfileMode::Append,
            timeout_secs: Some(10),
            ..Settings::default()
        }
        .save(&config)
        .unwrap();

        let cli = Cli::parse_from([
            "carpentry-installer",
            "--config",
            config.to_str().unwrap(),
            "--verbose",
            "warning",
            "--home",
            "/home/ada",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.profile_mode, ProfileMode::Append);
        assert_eq!(settings.timeout_secs, Some(10));
        assert_eq!(settings.verbosity, Severity::Warning);
        assert_eq!(settings.home_dir, Some(PathBuf::from("/home/ada")));
    }
}
