//! Logger factory
//!
//! `Log::new` builds a ready-to-use named logger. Root loggers get a console sink and,
//! optionally, a daily rotating file under `~/logs/<dir>/`. Child loggers are named
//! `<parent>.<child>` and reach the parent's sinks through the registry hierarchy.

pub mod panic_hook;

use crate::args::LogArgParser;
use crate::error::{Error, Result};
use crate::level::Level;
use crate::registry::{Logger, Registry};
use crate::sink::{ConsoleSink, RotationOptions, Sink, TimedRotatingFileSink};
use std::error::Error as StdError;
use std::fmt::Write as _;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name used when a root logger is created without one
pub const DEFAULT_NAME: &str = "easylogger";

/// Level used when nothing else decides it
pub const DEFAULT_LEVEL: Level = Level::Info;

/// Old daily log files kept by `Log`
pub const DEFAULT_BACKUP_COUNT: usize = 30;

/// Parameters for `Log::new`
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Root name, or the parent's name when `child_name` is set without `parent`
    pub name: Option<String>,
    pub parent: Option<Log>,
    pub child_name: Option<String>,
    /// Level name such as `DEBUG`; see `Log::new` for the fallback order
    pub level: Option<String>,
    pub log_to_file: bool,
    /// Subdirectory under the logs root, defaults to the logger name
    pub log_dir: Option<PathBuf>,
    /// Directory holding per-logger directories, defaults to `~/logs`
    pub logs_root: Option<PathBuf>,
    pub rotation: RotationOptions,
    /// Forces `DEBUG` instead of reading `--level` from the command line
    pub debugging: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            name: None,
            parent: None,
            child_name: None,
            level: None,
            log_to_file: false,
            log_dir: None,
            logs_root: None,
            rotation: RotationOptions {
                backup_count: DEFAULT_BACKUP_COUNT,
                ..RotationOptions::default()
            },
            debugging: false,
        }
    }
}

impl LogOptions {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn child(parent: &Log, child_name: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.clone()),
            child_name: Some(child_name.into()),
            ..Self::default()
        }
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn log_to_file(mut self, log_to_file: bool) -> Self {
        self.log_to_file = log_to_file;
        self
    }

    pub fn log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn logs_root(mut self, logs_root: impl Into<PathBuf>) -> Self {
        self.logs_root = Some(logs_root.into());
        self
    }

    pub fn rotation(mut self, rotation: RotationOptions) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn debugging(mut self, debugging: bool) -> Self {
        self.debugging = debugging;
        self
    }
}

/// A configured logger
///
/// Dereferences to the underlying [`Logger`] for `info`, `error`, etc.
#[derive(Debug, Clone)]
pub struct Log {
    logger: Logger,
    log_name: String,
    is_child: bool,
    level_str: String,
    log_to_file: bool,
    log_path: Option<PathBuf>,
}

impl Deref for Log {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

impl Log {
    /// Builds the logger described by `options`.
    ///
    /// The level is taken from `options.level`; otherwise children use their parent's
    /// level and roots read `-lvl/--level` from the command line (`DEBUG` when
    /// `options.debugging` is set, `INFO` when absent).
    pub fn new(options: LogOptions) -> Result<Self> {
        if options.parent.is_some() && options.child_name.is_none() {
            return Err(Error::InvalidSpec("a parent logger needs a child name".to_string()));
        }
        let is_child = options.child_name.is_some();
        let log_name = match (&options.parent, &options.name) {
            (Some(parent), _) => parent.name().to_string(),
            (None, Some(name)) => name.clone(),
            (None, None) => DEFAULT_NAME.to_string(),
        };
        let full_name = match &options.child_name {
            Some(child_name) => format!("{log_name}.{child_name}"),
            None => log_name.clone(),
        };

        let log_to_file = match (&options.parent, is_child) {
            (Some(parent), true) => parent.log_to_file(),
            _ => options.log_to_file,
        };

        let level_str = match options.level.clone() {
            Some(level) => level,
            None if is_child => Self::inherited_level(&options, &log_name)
                .name()
                .to_string(),
            None => LogArgParser::new(options.debugging)?
                .level_str()
                .to_string(),
        };
        let level: Level = level_str.parse()?;

        let logger = Logger::get(&full_name);
        logger.set_level(level);

        let mut log_path = None;
        if !is_child {
            // Recreating a root logger replaces its sinks instead of stacking them
            for sink in logger.remove_sinks() {
                if let Err(e) = sink.flush() {
                    warn!("Failed to flush replaced sink of {}: {}", full_name, e);
                }
            }
            logger.add_sink(Arc::new(ConsoleSink::new(level)));

            if log_to_file {
                let dir = Self::build_log_dir(&options, &log_name)?;
                let path = dir.join(&log_name);
                let sink = TimedRotatingFileSink::new(&path, options.rotation.clone(), level)?;
                logger.add_sink(Arc::new(sink));
                log_path = Some(path);
            }
        }

        let log = Log {
            logger,
            log_name,
            is_child,
            level_str,
            log_to_file,
            log_path,
        };
        if is_child {
            log.info("Logging initiated for child instance.");
        } else {
            log.info("Logging initiated.");
        }
        Ok(log)
    }

    /// Shorthand for a root logger with an explicit level
    pub fn root(name: impl Into<String>, level: &str) -> Result<Self> {
        Self::new(LogOptions::root(name).level(level))
    }

    /// Shorthand for a child inheriting this logger's level
    pub fn child(&self, child_name: impl Into<String>) -> Result<Self> {
        Self::new(LogOptions::child(self, child_name))
    }

    fn inherited_level(options: &LogOptions, parent_name: &str) -> Level {
        match &options.parent {
            Some(parent) => parent.level(),
            None => Registry::global()
                .lookup(parent_name)
                .map(|logger| logger.effective_level())
                .unwrap_or(DEFAULT_LEVEL),
        }
    }

    fn build_log_dir(options: &LogOptions, log_name: &str) -> Result<PathBuf> {
        let root = match &options.logs_root {
            Some(root) => root.clone(),
            None => dirs::home_dir().ok_or(Error::NoHomeDir)?.join("logs"),
        };
        let dir = match &options.log_dir {
            Some(log_dir) => root.join(log_dir),
            None => root.join(log_name),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
            debug!("Created log directory: {}", dir.display());
        }
        Ok(dir)
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Name given at construction (the parent's name for children)
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn is_child(&self) -> bool {
        self.is_child
    }

    pub fn level_str(&self) -> &str {
        &self.level_str
    }

    pub fn log_to_file(&self) -> bool {
        self.log_to_file
    }

    /// Base path of the rotating file, `<dir>/<name>`; files get a date and `.log` appended
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Logs `text` with the error and its source chain at error level.
    ///
    /// For `anyhow::Error`, pass `&*err`.
    pub fn error_from<E>(&self, err: &E, text: &str)
    where
        E: StdError + ?Sized,
    {
        self.error(format_error(err, text));
    }

    /// Installs a panic hook reporting panics through this logger
    pub fn install_panic_hook(&self) {
        panic_hook::install(self.logger.clone());
    }

    /// Logs the disconnect message; roots also flush and detach their sinks
    pub fn close(&self) {
        if self.is_child {
            self.info("Log disconnected for child instance.");
            return;
        }
        self.info(format!("Log disconnected.\n{}", "-".repeat(80)));
        for sink in self.logger.remove_sinks() {
            if let Err(e) = sink.flush() {
                warn!("Failed to flush sink of {}: {}", self.name(), e);
            }
        }
    }
}

/// `text`, then `Type: error`, then one `Caused by:` line per source
pub fn format_error<E>(err: &E, text: &str) -> String
where
    E: StdError + ?Sized,
{
    let mut message = format!("{text}\n{}: {err}", short_type_name::<E>());
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, "\nCaused by: {cause}");
        source = cause.source();
    }
    message
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.starts_with("dyn ") {
        return "Error";
    }
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::fmt;
    use tempfile::tempdir;

    #[derive(Debug)]
    struct ConnectError {
        source: std::io::Error,
    }

    impl fmt::Display for ConnectError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "unable to connect")
        }
    }

    impl StdError for ConnectError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.source)
        }
    }

    #[test]
    fn test_format_error_includes_type_and_chain() {
        let err = ConnectError {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let message = format_error(&err, "Request failed");
        assert_eq!(
            message,
            "Request failed\nConnectError: unable to connect\nCaused by: refused"
        );
    }

    #[test]
    fn test_format_error_std_type() {
        let err = "abc".parse::<i32>().unwrap_err();
        let message = format_error(&err, "Bad number");
        assert!(message.starts_with("Bad number\nParseIntError: "));
        assert!(message.contains("invalid digit"));
    }

    #[test]
    fn test_root_log_level_and_console_sink() {
        let log = Log::root("log_unit_root", "debug").unwrap();
        assert_eq!(log.name(), "log_unit_root");
        assert!(!log.is_child());
        assert_eq!(log.level(), Level::Debug);
        assert_eq!(log.level_str(), "debug");
        assert_eq!(log.sinks().len(), 1);
        assert!(log.log_path().is_none());
    }

    #[test]
    fn test_invalid_level_fails_fast() {
        let err = Log::root("log_unit_bad_level", "LOUDEST").unwrap_err();
        assert!(matches!(err, Error::InvalidLevel(_)));
    }

    #[test]
    fn test_recreating_root_replaces_sinks() {
        let first = Log::root("log_unit_recreate", "INFO").unwrap();
        let second = Log::root("log_unit_recreate", "WARNING").unwrap();
        assert_eq!(first.logger(), second.logger());
        assert_eq!(second.sinks().len(), 1);
        assert_eq!(first.level(), Level::Warning);
    }

    #[test]
    fn test_child_inherits_level_and_has_no_sinks() {
        let parent = Log::root("log_unit_parent", "ERROR").unwrap();
        let child = parent.child("worker").unwrap();
        assert_eq!(child.name(), "log_unit_parent.worker");
        assert_eq!(child.log_name(), "log_unit_parent");
        assert!(child.is_child());
        assert_eq!(child.level(), Level::Error);
        assert!(child.sinks().is_empty());
        assert_eq!(child.parent().unwrap(), *parent.logger());
    }

    #[test]
    fn test_child_of_named_parent_without_handle() {
        let _parent = Log::root("log_unit_named", "WARN").unwrap();
        let child = Log::new(LogOptions {
            name: Some("log_unit_named".to_string()),
            child_name: Some("sub".to_string()),
            ..LogOptions::default()
        })
        .unwrap();
        assert_eq!(child.name(), "log_unit_named.sub");
        assert_eq!(child.level(), Level::Warning);
    }

    #[test]
    fn test_debugging_forces_debug_level() {
        let log = Log::new(LogOptions::root("log_unit_debugging").debugging(true)).unwrap();
        assert_eq!(log.level(), Level::Debug);
    }

    #[test]
    fn test_parent_without_child_name_rejected() {
        let parent = Log::root("log_unit_orphan_parent", "INFO").unwrap();
        let sink = Arc::new(MemorySink::new(Level::Debug));
        parent.add_sink(sink.clone());
        let sinks_before = parent.sinks().len();

        let options = LogOptions {
            parent: Some(parent.clone()),
            ..LogOptions::default()
        };
        assert!(matches!(Log::new(options), Err(Error::InvalidSpec(_))));

        assert_eq!(parent.sinks().len(), sinks_before);
        parent.info("still attached");
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn test_file_output_under_logs_root() {
        let temp_dir = tempdir().unwrap();
        let log = Log::new(
            LogOptions::root("log_unit_file")
                .level("INFO")
                .log_to_file(true)
                .logs_root(temp_dir.path()),
        )
        .unwrap();

        let dir = temp_dir.path().join("log_unit_file");
        assert!(dir.is_dir());
        assert_eq!(log.log_path(), Some(dir.join("log_unit_file").as_path()));
        assert_eq!(log.sinks().len(), 2);

        log.close();
        let files: Vec<_> = fs::read_dir(&dir).unwrap().collect();
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(files[0].as_ref().unwrap().path()).unwrap();
        assert!(content.contains("Logging initiated."));
        assert!(content.contains("Log disconnected."));
        assert!(content.contains(&"-".repeat(80)));
    }

    #[test]
    fn test_custom_log_dir() {
        let temp_dir = tempdir().unwrap();
        let log = Log::new(
            LogOptions::root("log_unit_dir")
                .level("INFO")
                .log_to_file(true)
                .logs_root(temp_dir.path())
                .log_dir("shared"),
        )
        .unwrap();
        let expected = temp_dir.path().join("shared").join("log_unit_dir");
        assert_eq!(log.log_path(), Some(expected.as_path()));
        log.close();
    }

    #[test]
    fn test_error_from_logs_single_error_record() {
        let log = Log::root("log_unit_error_from", "DEBUG").unwrap();
        let sink = Arc::new(MemorySink::new(Level::Debug));
        log.add_sink(sink.clone());

        let err = "x".parse::<f64>().unwrap_err();
        log.error_from(&err, "Could not read ratio");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Error);
        assert!(records[0].message.contains("Could not read ratio"));
        assert!(records[0].message.contains("ParseFloatError"));
    }

    #[test]
    fn test_close_child_keeps_parent_sinks() {
        let parent = Log::root("log_unit_close", "DEBUG").unwrap();
        let sink = Arc::new(MemorySink::new(Level::Debug));
        parent.add_sink(sink.clone());
        let child = parent.child("part").unwrap();

        child.close();
        assert_eq!(parent.sinks().len(), 2);
        let last = sink.records().pop().unwrap();
        assert_eq!(last.message, "Log disconnected for child instance.");
        assert_eq!(last.name, "log_unit_close.part");
    }
}
