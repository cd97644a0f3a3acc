//! Spawn configuration for interactive sessions.
//!
//! One `SpawnConfig` describes how every session of a manager launches its
//! child process: executable, arguments, working directory, and the scraping
//! and timing knobs.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default delimiter pattern for connection-status scraping.
///
/// The pattern is split on its rightmost `|` into a left and right delimiter;
/// `##Sublime{|}##` matches output lines like `##Sublime{SCOTT@ORCL}##`.
pub const DEFAULT_STATUS_PATTERN: &str = "##Sublime{|}##";

/// How to launch and drive the interactive child process of a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    /// Executable to run (e.g. `sqlplus`).
    pub executable: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the child process and for filename completion.
    pub workdir: PathBuf,

    /// Delimiter pattern for connection-status scraping. An empty pattern or
    /// one without a `|` disables scraping.
    #[serde(default = "default_status_pattern")]
    pub status_pattern: String,

    /// Upper bound on a single input write before it fails with `WriteTimeout`.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// How long to wait for the child to exit after a graceful stop before
    /// force-killing it.
    #[serde(default = "default_terminate_grace_ms")]
    pub terminate_grace_ms: u64,
}

impl SpawnConfig {
    /// A config with default scraping and timing knobs.
    pub fn new(executable: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            workdir: workdir.into(),
            status_pattern: default_status_pattern(),
            write_timeout_ms: default_write_timeout_ms(),
            terminate_grace_ms: default_terminate_grace_ms(),
        }
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn terminate_grace(&self) -> Duration {
        Duration::from_millis(self.terminate_grace_ms)
    }
}

fn default_status_pattern() -> String {
    DEFAULT_STATUS_PATTERN.to_string()
}

fn default_write_timeout_ms() -> u64 {
    1000
}

fn default_terminate_grace_ms() -> u64 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let cfg = SpawnConfig::new("sqlplus", "/tmp");
        assert_eq!(cfg.executable, "sqlplus");
        assert!(cfg.args.is_empty());
        assert_eq!(cfg.status_pattern, DEFAULT_STATUS_PATTERN);
        assert_eq!(cfg.write_timeout(), Duration::from_millis(1000));
        assert_eq!(cfg.terminate_grace(), Duration::from_millis(3000));
    }
}
