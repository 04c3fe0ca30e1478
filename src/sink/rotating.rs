//! Time-based rotating file output
//!
//! Files are named `<base>.<timestamp><postfix>`, e.g. `~/logs/app/app.2024-01-03.log`.
//! On rollover a new file is opened for the new period and, when a backup count is
//! set, the oldest files matching the naming scheme are removed.

use super::{open_append, Sink, SinkLevel};
use crate::error::{Error, Result};
use crate::level::Level;
use crate::record::{Formatter, Record};
use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

const DAY_SECS: i64 = 24 * 60 * 60;

/// Rollover period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Second,
    Minute,
    Hour,
    /// Every 24 hours, counted from when the file was opened
    Day,
    /// At `at_time` every day
    Midnight,
    /// At `at_time` on the given weekday (0 is Monday)
    Weekday(u8),
}

impl When {
    fn unit_secs(self) -> i64 {
        match self {
            When::Second => 1,
            When::Minute => 60,
            When::Hour => 60 * 60,
            When::Day | When::Midnight => DAY_SECS,
            When::Weekday(_) => 7 * DAY_SECS,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            When::Second => "%Y-%m-%d_%H-%M-%S",
            When::Minute => "%Y-%m-%d_%H-%M",
            When::Hour => "%Y-%m-%d_%H",
            When::Day | When::Midnight | When::Weekday(_) => "%Y-%m-%d",
        }
    }

    fn ext_pattern(self) -> &'static str {
        match self {
            When::Second => r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}$",
            When::Minute => r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}$",
            When::Hour => r"^\d{4}-\d{2}-\d{2}_\d{2}$",
            When::Day | When::Midnight | When::Weekday(_) => r"^\d{4}-\d{2}-\d{2}$",
        }
    }

    fn is_clock_aligned(self) -> bool {
        matches!(self, When::Midnight | When::Weekday(_))
    }
}

impl FromStr for When {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "S" => Ok(When::Second),
            "M" => Ok(When::Minute),
            "H" => Ok(When::Hour),
            "D" => Ok(When::Day),
            "MIDNIGHT" => Ok(When::Midnight),
            weekly if weekly.starts_with('W') => match weekly[1..].parse::<u8>() {
                Ok(day) if weekly.len() == 2 && day <= 6 => Ok(When::Weekday(day)),
                _ => Err(Error::InvalidRotation(format!(
                    "weekly rollover needs a day from 0 to 6 (0 is Monday): {s}"
                ))),
            },
            _ => Err(Error::InvalidRotation(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationOptions {
    pub when: When,
    /// Multiplier for the rollover period
    pub interval: u32,
    /// Number of old files to keep; 0 keeps everything
    pub backup_count: usize,
    pub utc: bool,
    pub postfix: String,
    /// Time of day for `Midnight` and `Weekday` rollovers
    pub at_time: NaiveTime,
}

impl Default for RotationOptions {
    fn default() -> Self {
        Self {
            when: When::Day,
            interval: 1,
            backup_count: 0,
            utc: false,
            postfix: ".log".to_string(),
            at_time: NaiveTime::default(),
        }
    }
}

/// File naming and rollover arithmetic, independent of the open file
#[derive(Debug)]
struct Schedule {
    base: PathBuf,
    options: RotationOptions,
    interval_secs: i64,
    ext_match: Regex,
}

impl Schedule {
    fn new(base: PathBuf, options: RotationOptions) -> Result<Self> {
        if options.interval == 0 {
            return Err(Error::InvalidRotation(
                "interval must be at least 1".to_string(),
            ));
        }
        let ext_match = Regex::new(options.when.ext_pattern())
            .map_err(|e| Error::InvalidRotation(e.to_string()))?;
        let interval_secs = options.when.unit_secs() * i64::from(options.interval);

        Ok(Self {
            base,
            options,
            interval_secs,
            ext_match,
        })
    }

    fn naive(&self, timestamp: i64) -> Option<NaiveDateTime> {
        if self.options.utc {
            DateTime::from_timestamp(timestamp, 0).map(|t| t.naive_utc())
        } else {
            Local
                .timestamp_opt(timestamp, 0)
                .earliest()
                .map(|t| t.naive_local())
        }
    }

    fn utc_offset(&self, timestamp: i64) -> i64 {
        if self.options.utc {
            return 0;
        }
        Local
            .timestamp_opt(timestamp, 0)
            .earliest()
            .map(|t| i64::from(t.offset().local_minus_utc()))
            .unwrap_or(0)
    }

    fn filename_for(&self, timestamp: i64) -> PathBuf {
        let stamp = self
            .naive(timestamp)
            .map(|t| t.format(self.options.when.suffix()).to_string())
            .unwrap_or_default();

        let mut name = self.base.clone().into_os_string();
        name.push(".");
        name.push(stamp);
        name.push(&self.options.postfix);
        PathBuf::from(name)
    }

    fn compute_rollover(&self, now: i64) -> i64 {
        let result = now + self.interval_secs;
        if !self.options.when.is_clock_aligned() {
            return result;
        }
        let Some(current) = self.naive(now) else {
            return result;
        };

        let current_secs = i64::from(current.num_seconds_from_midnight());
        let rotate_secs = i64::from(self.options.at_time.num_seconds_from_midnight());
        let mut day = i64::from(current.weekday().num_days_from_monday());

        // Seconds until the next `at_time`, tomorrow if already passed today
        let mut wait = rotate_secs - current_secs;
        if wait <= 0 {
            wait += DAY_SECS;
            day = (day + 1) % 7;
        }
        let mut result = now + wait;

        if let When::Weekday(target) = self.options.when {
            let target = i64::from(target);
            if day != target {
                let days_to_wait = if day < target {
                    target - day
                } else {
                    6 - day + target + 1
                };
                result += days_to_wait * DAY_SECS;
            }
        }

        // Wall clock shifts (DST) between now and the rollover
        result + self.utc_offset(now) - self.utc_offset(result)
    }

    /// Old files to remove so that only `backup_count` remain besides `current`
    fn files_to_delete(&self, current: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = match self.base.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let Some(base_name) = self.base.file_name().and_then(|n| n.to_str()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{base_name}.");
        let current_name = current.file_name().and_then(|n| n.to_str());

        let mut result = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let file_name = entry?.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if Some(name) == current_name {
                continue;
            }
            let stamp = name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(self.options.postfix.as_str()));
            if let Some(stamp) = stamp {
                if !stamp.is_empty() && self.ext_match.is_match(stamp) {
                    result.push(dir.join(name));
                }
            }
        }

        result.sort();
        let excess = result.len().saturating_sub(self.options.backup_count);
        result.truncate(excess);
        Ok(result)
    }

    fn prune(&self, current: &Path) {
        if self.options.backup_count == 0 {
            return;
        }
        let files = match self.files_to_delete(current) {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Failed to list old log files for {}: {}",
                    self.base.display(),
                    e
                );
                return;
            }
        };
        for path in files {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed old log file: {}", path.display()),
                Err(e) => warn!("Failed to remove old log file {}: {}", path.display(), e),
            }
        }
    }
}

#[derive(Debug)]
struct RotatingState {
    file: File,
    path: PathBuf,
    rollover_at: i64,
}

/// File sink that switches to a new date-stamped file every period
#[derive(Debug)]
pub struct TimedRotatingFileSink {
    schedule: Schedule,
    level: SinkLevel,
    formatter: Formatter,
    state: Mutex<RotatingState>,
}

impl TimedRotatingFileSink {
    pub fn new(base: impl AsRef<Path>, options: RotationOptions, level: Level) -> Result<Self> {
        Self::starting_at(base, options, level, Utc::now().timestamp())
    }

    /// Opens the file for the period containing `now` (unix seconds)
    pub fn starting_at(
        base: impl AsRef<Path>,
        options: RotationOptions,
        level: Level,
        now: i64,
    ) -> Result<Self> {
        let schedule = Schedule::new(base.as_ref().to_path_buf(), options)?;
        let path = schedule.filename_for(now);
        let file = open_append(&path).map_err(|e| Error::io(&path, e))?;
        let rollover_at = schedule.compute_rollover(now);
        schedule.prune(&path);
        debug!(
            "Opened rotating log file {} (next rollover at {})",
            path.display(),
            rollover_at
        );

        Ok(Self {
            schedule,
            level: SinkLevel::new(level),
            formatter: Formatter::default(),
            state: Mutex::new(RotatingState {
                file,
                path,
                rollover_at,
            }),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.schedule.base
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .path
            .clone()
    }

    /// Unix time of the next rollover
    pub fn rollover_at(&self) -> i64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rollover_at
    }

    fn rollover(&self, state: &mut RotatingState) -> io::Result<()> {
        let current = state.rollover_at;
        let path = self.schedule.filename_for(current);
        state.file.flush()?;
        state.file = open_append(&path)?;
        debug!("Rolled log over to {}", path.display());
        state.path = path;
        self.schedule.prune(&state.path);

        let mut next = self.schedule.compute_rollover(current);
        while next <= current {
            next += self.schedule.interval_secs;
        }
        state.rollover_at = next;
        Ok(())
    }
}

impl Sink for TimedRotatingFileSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: &Record) -> io::Result<()> {
        let line = self.formatter.format(record);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if record.time.timestamp() >= state.rollover_at {
            self.rollover(&mut state)?;
        }
        writeln!(state.file, "{line}")
    }

    fn flush(&self) -> io::Result<()> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .file
            .flush()
    }
}
