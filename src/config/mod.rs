//! YAML configuration for the logger factory

use crate::args::ArgSpec;
use crate::error::{Error, Result};
use crate::log::{LogOptions, DEFAULT_BACKUP_COUNT, DEFAULT_NAME};
use crate::sink::{RotationOptions, When};
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure matching the `easylogger.yaml` format
///
/// ```yaml
/// name: my_app
/// level: DEBUG
/// log_to_file: true
/// rotation:
///   when: MIDNIGHT
///   backup_count: 7
/// args:
///   - names: ["-t", "--this"]
///     other: { default: hello }
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Level name; unset reads `-lvl/--level` from the command line
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub log_to_file: bool,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub logs_root: Option<PathBuf>,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            level: None,
            log_to_file: false,
            log_dir: None,
            logs_root: None,
            rotation: RotationConfig::default(),
            args: Vec::new(),
        }
    }
}

impl LogConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Options for the root logger described by this configuration
    pub fn to_options(&self) -> Result<LogOptions> {
        let mut options = LogOptions::root(self.name.clone())
            .log_to_file(self.log_to_file)
            .rotation(self.rotation.to_options()?);
        if let Some(level) = &self.level {
            options = options.level(level.clone());
        }
        if let Some(log_dir) = &self.log_dir {
            options = options.log_dir(log_dir.clone());
        }
        if let Some(logs_root) = &self.logs_root {
            options = options.logs_root(logs_root.clone());
        }
        Ok(options)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RotationConfig {
    /// `S`, `M`, `H`, `D`, `MIDNIGHT` or `W0`..`W6`
    #[serde(default = "default_when")]
    pub when: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,
    #[serde(default)]
    pub utc: bool,
    #[serde(default = "default_postfix")]
    pub postfix: String,
    /// `HH:MM[:SS]` for midnight and weekly rollovers
    #[serde(default)]
    pub at_time: Option<String>,
}

fn default_when() -> String {
    "D".to_string()
}

fn default_interval() -> u32 {
    1
}

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

fn default_postfix() -> String {
    ".log".to_string()
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            when: default_when(),
            interval: default_interval(),
            backup_count: default_backup_count(),
            utc: false,
            postfix: default_postfix(),
            at_time: None,
        }
    }
}

impl RotationConfig {
    pub fn to_options(&self) -> Result<RotationOptions> {
        let when: When = self.when.parse()?;
        let at_time = match &self.at_time {
            None => NaiveTime::default(),
            Some(text) => NaiveTime::parse_from_str(text, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
                .map_err(|e| Error::InvalidRotation(format!("at_time {text:?}: {e}")))?,
        };
        Ok(RotationOptions {
            when,
            interval: self.interval,
            backup_count: self.backup_count,
            utc: self.utc,
            postfix: self.postfix.clone(),
            at_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LogConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.name, "easylogger");
        assert_eq!(config.rotation.backup_count, 30);

        let rotation = config.rotation.to_options().unwrap();
        assert_eq!(rotation.when, When::Day);
        assert_eq!(rotation.interval, 1);
        assert_eq!(rotation.postfix, ".log");
    }

    #[test]
    fn test_load_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
name: billing
level: DEBUG
log_to_file: true
log_dir: shared
rotation:
  when: W2
  backup_count: 4
  utc: true
  at_time: "03:30"
args:
  - names: ["-t", "--this"]
    other:
      action: store
      default: hello
"#
        )
        .unwrap();

        let config = LogConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.name, "billing");
        assert_eq!(config.level.as_deref(), Some("DEBUG"));
        assert_eq!(config.args.len(), 1);
        assert_eq!(config.args[0].names, vec!["-t", "--this"]);

        let options = config.to_options().unwrap();
        assert_eq!(options.name.as_deref(), Some("billing"));
        assert!(options.log_to_file);
        assert_eq!(options.log_dir, Some(PathBuf::from("shared")));
        assert_eq!(options.rotation.when, When::Weekday(2));
        assert_eq!(options.rotation.backup_count, 4);
        assert!(options.rotation.utc);
        assert_eq!(
            options.rotation.at_time,
            NaiveTime::from_hms_opt(3, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_rotation() {
        let config = LogConfig::from_yaml_str("rotation: { when: W9 }").unwrap();
        assert!(matches!(
            config.to_options(),
            Err(Error::InvalidRotation(_))
        ));

        let config = LogConfig::from_yaml_str("rotation: { at_time: noon }").unwrap();
        assert!(matches!(
            config.rotation.to_options(),
            Err(Error::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = LogConfig::from_file(Path::new("/nonexistent/easylogger.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            LogConfig::from_yaml_str("name: [unclosed"),
            Err(Error::Yaml(_))
        ));
    }
}
