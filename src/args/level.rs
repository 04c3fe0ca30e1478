//! `-lvl/--level` command-line option

use super::{ArgParse, ArgSpec};
use crate::error::Result;
use crate::level::Level;
use std::env;
use std::ffi::OsString;
use tracing::debug;

pub const DEFAULT_LEVEL_STR: &str = "INFO";

/// Reads the log level from the command line, ignoring every other argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogArgParser {
    level_str: String,
}

impl LogArgParser {
    pub fn specs() -> Vec<ArgSpec> {
        vec![ArgSpec::new(["-lvl", "--level"])
            .with("action", "store")
            .with("default", DEFAULT_LEVEL_STR)
            .with("help", "Log level")]
    }

    /// Parses the process arguments; `is_debugging` skips parsing and yields `DEBUG`
    pub fn new(is_debugging: bool) -> Result<Self> {
        Self::from_args(env::args_os().skip(1), is_debugging)
    }

    pub fn from_args<I, T>(args: I, is_debugging: bool) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        if is_debugging {
            debug!("Debugging enabled, skipping level argument");
            return Ok(Self {
                level_str: Level::Debug.name().to_string(),
            });
        }

        let mut parser = ArgParse::new(&Self::specs(), false)?;
        parser.parse_from(args)?;
        let level_str = parser
            .arg_dict()
            .get_str("level")
            .unwrap_or(DEFAULT_LEVEL_STR)
            .to_string();
        Ok(Self { level_str })
    }

    pub fn level_str(&self) -> &str {
        &self.level_str
    }

    pub fn level(&self) -> Result<Level> {
        self.level_str.parse()
    }
}
