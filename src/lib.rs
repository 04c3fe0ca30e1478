//! Logger setup with console and rotating file output, plus a declarative
//! command-line argument parser builder.
//!
//! ```no_run
//! use easylogger::{Log, LogOptions};
//!
//! let log = Log::new(LogOptions::root("my_app").level("DEBUG").log_to_file(true))?;
//! log.info("started");
//!
//! let worker = log.child("worker")?;
//! worker.warning("queue is getting long");
//! # Ok::<(), easylogger::Error>(())
//! ```

pub mod args;
pub mod bridge;
pub mod config;
pub mod error;
pub mod level;
pub mod log;
pub mod record;
pub mod registry;
pub mod sink;

// Public API
pub use args::{ArgParse, ArgSpec, LogArgParser, Namespace, Parsed};
pub use config::{LogConfig, RotationConfig};
pub use error::{Error, Result};
pub use level::Level;
pub use log::{format_error, Log, LogOptions};
pub use record::{Formatter, Record};
pub use registry::{Logger, Registry};
pub use sink::{
    ConsoleSink, FileSink, MemorySink, RotationOptions, Sink, TimedRotatingFileSink, When,
};
