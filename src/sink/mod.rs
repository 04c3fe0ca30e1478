//! Output destinations for log records

pub mod rotating;

use crate::error::{Error, Result};
use crate::level::Level;
use crate::record::{Formatter, Record};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, PoisonError};

pub use rotating::{RotationOptions, TimedRotatingFileSink, When};

/// A destination for records, with its own severity threshold
pub trait Sink: Send + Sync + fmt::Debug {
    fn level(&self) -> Level;

    fn set_level(&self, level: Level);

    /// Writes the record unconditionally; threshold checks happen in the logger
    fn emit(&self, record: &Record) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn accepts(&self, level: Level) -> bool {
        level >= self.level()
    }
}

/// Threshold storage shared by the sinks in this module
#[derive(Debug)]
pub(crate) struct SinkLevel(AtomicU8);

impl SinkLevel {
    pub(crate) fn new(level: Level) -> Self {
        Self(AtomicU8::new(level.value()))
    }

    pub(crate) fn get(&self) -> Level {
        Level::from_value(self.0.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub(crate) fn set(&self, level: Level) {
        self.0.store(level.value(), Ordering::Relaxed);
    }
}

/// Writes formatted records to stderr
#[derive(Debug)]
pub struct ConsoleSink {
    level: SinkLevel,
    formatter: Formatter,
}

impl ConsoleSink {
    pub fn new(level: Level) -> Self {
        Self {
            level: SinkLevel::new(level),
            formatter: Formatter::default(),
        }
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }
}

impl Sink for ConsoleSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: &Record) -> io::Result<()> {
        let line = self.formatter.format(record);
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{line}")
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Appends formatted records to a single file
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    level: SinkLevel,
    formatter: Formatter,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>, level: Level) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self {
            path,
            level: SinkLevel::new(level),
            formatter: Formatter::default(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: &Record) -> io::Result<()> {
        let line = self.formatter.format(record);
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(file, "{line}")
    }

    fn flush(&self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

/// Keeps records in memory, for inspection by the caller
#[derive(Debug)]
pub struct MemorySink {
    level: SinkLevel,
    formatter: Formatter,
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    pub fn new(level: Level) -> Self {
        Self {
            level: SinkLevel::new(level),
            formatter: Formatter::default(),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records rendered with this sink's formatter
    pub fn lines(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|record| self.formatter.format(record))
            .collect()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Sink for MemorySink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: &Record) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

pub(crate) fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
