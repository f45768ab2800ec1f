//! Configuration loading and validation.
//!
//! Configuration lives at `$XDG_CONFIG_HOME/riverwatch/config.toml`
//! (default `~/.config/riverwatch/config.toml`). A missing default file is
//! not an error; every field has a sensible default so the client works out
//! of the box on a stock river setup.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Settings for the compositor control seam.
    #[serde(default)]
    pub control: ControlConfig,
}

/// Settings for shelling out to the compositor control utility.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlConfig {
    /// Executable used to issue control commands (resolved via `$PATH`
    /// unless an absolute path is given).
    #[serde(default = "default_riverctl")]
    pub riverctl: String,
}

fn default_riverctl() -> String {
    "riverctl".to_string()
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            riverctl: default_riverctl(),
        }
    }
}

/// Default path of the configuration file.
///
/// `$XDG_CONFIG_HOME/riverwatch/config.toml`, falling back to
/// `~/.config/riverwatch/config.toml`.
pub fn default_path() -> PathBuf {
    let config_home = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.config")
    });
    PathBuf::from(config_home)
        .join("riverwatch")
        .join("config.toml")
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns `Config::default()` if no file exists there.
    pub fn load() -> Result<Self> {
        let path = default_path();
        if !path.exists() {
            debug!("no config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`Config::load`], a missing file here is an error, since the
    /// user asked for that specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        debug!("loaded config from {:?}", path);
        Ok(config)
    }

    /// Validate field values, collecting every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.control.riverctl.trim().is_empty() {
            problems.push("control.riverctl must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.control.riverctl, "riverctl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_control_section() {
        let config: Config = toml::from_str(
            r#"
            [control]
            riverctl = "/usr/local/bin/riverctl"
            "#,
        )
        .unwrap();
        assert_eq!(config.control.riverctl, "/usr/local/bin/riverctl");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.control.riverctl, "riverctl");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = toml::from_str::<Config>("[controll]\nriverctl = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn empty_riverctl_fails_validation() {
        let config: Config = toml::from_str("[control]\nriverctl = \"  \"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigValidation(_)));
    }

    #[test]
    fn load_from_missing_path_is_an_error() {
        let err = Config::load_from(Path::new("/nonexistent/riverwatch.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn load_from_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[control]\nriverctl = \"riverctl-test\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.control.riverctl, "riverctl-test");
    }
}
