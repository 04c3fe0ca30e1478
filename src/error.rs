use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the logger factory and the argument parser builder
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown log level: {0:?}")]
    InvalidLevel(String),
    #[error("Invalid rollover interval specified: {0}")]
    InvalidRotation(String),
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to determine the home directory")]
    NoHomeDir,
    #[error("Conflicting option string: {0}")]
    DuplicateArgument(String),
    #[error("Unsupported option '{key}' for argument '{dest}'")]
    UnsupportedOption { dest: String, key: String },
    #[error("Invalid argument specification: {0}")]
    InvalidSpec(String),
    #[error("Invalid value {value:?} for argument '{dest}': {reason}")]
    InvalidValue {
        dest: String,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Parse(#[from] clap::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
