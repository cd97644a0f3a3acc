//! CLI configuration at `~/.tabsh/config.toml`.
//!
//! Provides the default executable, arguments, and working directory for
//! sessions. CLI flags always override config file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tabsh_core::{SpawnConfig, DEFAULT_STATUS_PATTERN};
use tracing::debug;

/// Top-level config file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// `[session]` section: how to launch the wrapped tool.
    #[serde(default)]
    pub session: SessionSection,
}

/// `[session]` section of the config TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Executable to wrap.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Arguments passed to the executable.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Prepend `-S` to suppress the SQL*Plus banner.
    #[serde(default = "default_true")]
    pub silent: bool,

    /// Working directory for the child and for filename completion.
    #[serde(default = "default_workdir")]
    pub workdir: String,

    /// Delimiter pattern for connection-status scraping.
    #[serde(default = "default_status_pattern")]
    pub status_pattern: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: default_args(),
            silent: default_true(),
            workdir: default_workdir(),
            status_pattern: default_status_pattern(),
        }
    }
}

fn default_executable() -> String {
    "sqlplus".to_string()
}

fn default_args() -> Vec<String> {
    vec!["/nolog".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_workdir() -> String {
    ".".to_string()
}

fn default_status_pattern() -> String {
    DEFAULT_STATUS_PATTERN.to_string()
}

impl Config {
    /// Load configuration from a TOML file, returning defaults if the file
    /// does not exist.
    pub fn load(path: &str) -> Result<Self> {
        let path = expand_tilde(path);
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Build the engine spawn configuration, applying CLI overrides.
    pub fn to_spawn_config(
        &self,
        cli_executable: Option<&str>,
        cli_workdir: Option<&str>,
    ) -> SpawnConfig {
        let section = &self.session;
        let executable = cli_executable.unwrap_or(&section.executable);
        let workdir = expand_tilde(cli_workdir.unwrap_or(&section.workdir));

        let mut args = Vec::new();
        if section.silent {
            args.push("-S".to_string());
        }
        args.extend(section.args.iter().cloned());

        let mut config = SpawnConfig::new(executable, workdir);
        config.args = args;
        config.status_pattern = section.status_pattern.clone();
        config
    }
}

/// Expand `~` to the user's home directory.
fn expand_tilde(s: &str) -> PathBuf {
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    Path::new(s).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.session.executable, "sqlplus");
        assert_eq!(cfg.session.args, vec!["/nolog"]);
        assert!(cfg.session.silent);
        assert_eq!(cfg.session.workdir, ".");
        assert_eq!(cfg.session.status_pattern, DEFAULT_STATUS_PATTERN);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[session]
executable = "/opt/oracle/bin/sqlplus"
args = ["scott/tiger@orcl"]
silent = false
workdir = "/srv/sql"
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.session.executable, "/opt/oracle/bin/sqlplus");
        assert_eq!(cfg.session.args, vec!["scott/tiger@orcl"]);
        assert!(!cfg.session.silent);
        assert_eq!(cfg.session.workdir, "/srv/sql");
        // Untouched fields keep their defaults.
        assert_eq!(cfg.session.status_pattern, DEFAULT_STATUS_PATTERN);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load("/no/such/config.toml").unwrap();
        assert_eq!(cfg.session.executable, "sqlplus");
    }

    #[test]
    fn spawn_config_applies_overrides_and_silent_flag() {
        let cfg = Config::default();
        let spawn = cfg.to_spawn_config(Some("cat"), Some("/tmp"));
        assert_eq!(spawn.executable, "cat");
        assert_eq!(spawn.workdir, PathBuf::from("/tmp"));
        assert_eq!(spawn.args, vec!["-S", "/nolog"]);
    }

    #[test]
    fn spawn_config_without_silent() {
        let mut cfg = Config::default();
        cfg.session.silent = false;
        let spawn = cfg.to_spawn_config(None, None);
        assert_eq!(spawn.args, vec!["/nolog"]);
    }

    #[test]
    fn load_from_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nexecutable = \"cat\"\n").unwrap();
        let cfg = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.session.executable, "cat");
        assert_eq!(cfg.session.args, vec!["/nolog"]);
    }
}
