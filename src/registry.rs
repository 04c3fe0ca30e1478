//! Process-wide logger registry
//!
//! Loggers are identified by dotted names. Asking for the same name twice returns the
//! same handle. A logger without its own level defers to its nearest ancestor, and
//! records handled by a logger travel up through its ancestors' sinks while
//! `propagate` is set.

use crate::level::Level;
use crate::record::Record;
use crate::sink::Sink;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use tracing::warn;

/// Effective level when neither a logger nor any ancestor sets one
pub const ROOT_LEVEL: Level = Level::Warning;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

#[derive(Debug, Default)]
pub struct Registry {
    loggers: Mutex<HashMap<String, Logger>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Returns the logger with this name, creating it if needed
    pub fn get(&'static self, name: &str) -> Logger {
        let mut loggers = self.loggers.lock().unwrap_or_else(PoisonError::into_inner);
        loggers
            .entry(name.to_string())
            .or_insert_with(|| Logger::new(self, name))
            .clone()
    }

    pub fn lookup(&self, name: &str) -> Option<Logger> {
        self.loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// The logger itself or its closest registered ancestor
    pub fn lookup_nearest(&self, name: &str) -> Option<Logger> {
        self.lookup(name)
            .or_else(|| ancestors(name).find_map(|ancestor| self.lookup(ancestor)))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// `a.b.c` -> `a.b`, `a`
fn ancestors(name: &str) -> impl Iterator<Item = &str> {
    name.char_indices()
        .rev()
        .filter(|&(_, c)| c == '.')
        .map(move |(i, _)| &name[..i])
}

#[derive(Debug)]
struct LoggerCore {
    name: String,
    level: AtomicU8,
    propagate: AtomicBool,
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
}

/// Cheap handle onto a registered logger
#[derive(Clone)]
pub struct Logger {
    registry: &'static Registry,
    core: Arc<LoggerCore>,
}

// The registry refers back to its loggers, so only print this logger's own state
impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.core.name)
            .field("level", &self.level())
            .field("propagate", &self.propagate())
            .field("sinks", &self.sinks().len())
            .finish()
    }
}

impl PartialEq for Logger {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Logger {}

impl Logger {
    fn new(registry: &'static Registry, name: &str) -> Self {
        Self {
            registry,
            core: Arc::new(LoggerCore {
                name: name.to_string(),
                level: AtomicU8::new(Level::NotSet.value()),
                propagate: AtomicBool::new(true),
                sinks: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Logger `name` in the global registry
    pub fn get(name: &str) -> Logger {
        Registry::global().get(name)
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// The level set on this logger, possibly `NotSet`
    pub fn level(&self) -> Level {
        Level::from_value(self.core.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: Level) {
        self.core.level.store(level.value(), Ordering::Relaxed);
    }

    /// The threshold actually applied: own level, else the nearest ancestor's
    pub fn effective_level(&self) -> Level {
        let own = self.level();
        if own != Level::NotSet {
            return own;
        }
        ancestors(self.name())
            .filter_map(|ancestor| self.registry.lookup(ancestor))
            .map(|logger| logger.level())
            .find(|&level| level != Level::NotSet)
            .unwrap_or(ROOT_LEVEL)
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level != Level::NotSet && level >= self.effective_level()
    }

    /// Closest registered ancestor
    pub fn parent(&self) -> Option<Logger> {
        ancestors(self.name()).find_map(|ancestor| self.registry.lookup(ancestor))
    }

    /// `parent.child`, registered in the same registry
    pub fn child(&self, suffix: &str) -> Logger {
        self.registry.get(&format!("{}.{}", self.name(), suffix))
    }

    pub fn propagate(&self) -> bool {
        self.core.propagate.load(Ordering::Relaxed)
    }

    pub fn set_propagate(&self, propagate: bool) {
        self.core.propagate.store(propagate, Ordering::Relaxed);
    }

    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.core
            .sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    /// Detaches all sinks, returning them
    pub fn remove_sinks(&self) -> Vec<Arc<dyn Sink>> {
        std::mem::take(
            &mut *self
                .core
                .sinks
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.core
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.is_enabled_for(level) {
            return;
        }
        self.handle(&Record::new(self.name(), level, message));
    }

    /// Passes the record to this logger's sinks and up the hierarchy
    pub fn handle(&self, record: &Record) {
        let mut current = Some(self.clone());
        while let Some(logger) = current {
            for sink in logger.sinks() {
                if !sink.accepts(record.level) {
                    continue;
                }
                if let Err(e) = sink.emit(record) {
                    warn!("Failed to write record for {}: {}", record.name, e);
                }
            }
            if !logger.propagate() {
                break;
            }
            current = logger.parent();
        }
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }
}
