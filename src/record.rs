//! Log records and their text rendering

use crate::level::Level;
use chrono::{DateTime, Local};

/// Timestamp format, millisecond precision
pub const DEFAULT_TIME_FMT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// A single log event
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Dotted name of the logger the record was created on
    pub name: String,
    pub level: Level,
    pub message: String,
    pub time: DateTime<Local>,
    pub pid: u32,
}

impl Record {
    pub fn new(name: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            message: message.into(),
            time: Local::now(),
            pid: std::process::id(),
        }
    }
}

/// Renders records as `{time} - {name}_{pid} - {level:<8} {message}`
#[derive(Debug, Clone)]
pub struct Formatter {
    time_fmt: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            time_fmt: DEFAULT_TIME_FMT.to_string(),
        }
    }
}

impl Formatter {
    pub fn with_time_format(time_fmt: impl Into<String>) -> Self {
        Self {
            time_fmt: time_fmt.into(),
        }
    }

    pub fn format(&self, record: &Record) -> String {
        format!(
            "{} - {}_{} - {:<8} {}",
            record.time.format(&self.time_fmt),
            record.name,
            record.pid,
            record.level,
            record.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_layout() {
        let mut record = Record::new("app.worker", Level::Warning, "disk almost full");
        record.time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        record.pid = 4242;

        let line = Formatter::default().format(&record);
        assert_eq!(
            line,
            "2024-03-09 14:05:07,000 - app.worker_4242 - WARNING  disk almost full"
        );
    }

    #[test]
    fn test_custom_time_format() {
        let mut record = Record::new("app", Level::Info, "ready");
        record.time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();

        let line = Formatter::with_time_format("%H:%M").format(&record);
        assert!(line.starts_with("14:05 - app_"));
        assert!(line.ends_with("INFO     ready"));
    }
}
