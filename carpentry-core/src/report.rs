//! Explicit log sinks handed to every component.
//!
//! Components never log through ambient state alone: they receive a
//! `&dyn Reporter` carrying its own severity threshold. The CLI passes a
//! [`TracingReporter`]; tests pass a [`MemoryReporter`] or [`SilentReporter`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

// ============================================================================
// Severity
// ============================================================================

/// Log severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Returns all severities, most verbose first.
    pub fn all() -> &'static [Severity] {
        &[
            Self::Debug,
            Self::Info,
            Self::Warning,
            Self::Error,
            Self::Critical,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// The closest `tracing` level. `tracing` has no critical level.
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown verbosity: {}", s)),
        }
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// A log sink with a configured threshold.
pub trait Reporter: Send + Sync {
    /// Messages below this severity are dropped.
    fn threshold(&self) -> Severity;

    /// Records a message that already passed the threshold.
    fn record(&self, severity: Severity, message: &str);

    fn report(&self, severity: Severity, message: &str) {
        if severity >= self.threshold() {
            self.record(severity, message);
        }
    }

    fn debug(&self, message: &str) {
        self.report(Severity::Debug, message);
    }

    fn info(&self, message: &str) {
        self.report(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Severity::Warning, message);
    }
}

/// Forwards to `tracing` under the `carpentry` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingReporter {
    threshold: Severity,
}

impl TracingReporter {
    pub fn new(threshold: Severity) -> Self {
        Self { threshold }
    }
}

impl Reporter for TracingReporter {
    fn threshold(&self) -> Severity {
        self.threshold
    }

    fn record(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(target: "carpentry", "{}", message),
            Severity::Info => tracing::info!(target: "carpentry", "{}", message),
            Severity::Warning => tracing::warn!(target: "carpentry", "{}", message),
            Severity::Error | Severity::Critical => {
                tracing::error!(target: "carpentry", "{}", message)
            }
        }
    }
}

/// Drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn threshold(&self) -> Severity {
        Severity::Critical
    }

    fn record(&self, _severity: Severity, _message: &str) {}
}

/// Captures messages in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    threshold: Severity,
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemoryReporter {
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Returns a copy of every captured message.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True if any captured message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn threshold(&self) -> Severity {
        self.threshold
    }

    fn record(&self, severity: Severity, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("debug".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("critical".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_critical_maps_to_error_level() {
        assert_eq!(Severity::Critical.tracing_level(), tracing::Level::ERROR);
        assert_eq!(Severity::Warning.tracing_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_memory_reporter_honors_threshold() {
        let reporter = MemoryReporter::new(Severity::Info);
        reporter.debug("hidden");
        reporter.info("shown");
        reporter.warn("also shown");

        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (Severity::Info, "shown".to_string()));
        assert!(!reporter.contains("hidden"));
    }

    #[test]
    fn test_silent_reporter_drops_everything() {
        let reporter = SilentReporter;
        reporter.warn("nothing happens");
        assert_eq!(reporter.threshold(), Severity::Critical);
    }
}
