//! Forwards `tracing` events into registry loggers
//!
//! The event target is read as a logger name with `::` replaced by `.`, so an event
//! from `my_app::db` reaches logger `my_app.db`, or `my_app` if that is the closest
//! registered one.

use crate::level::Level;
use crate::registry::{Logger, Registry};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Events from this crate are never forwarded, sink failures would loop back
const OWN_TARGET: &str = "easylogger";

pub struct RegistryLayer {
    registry: &'static Registry,
    fallback: Option<Logger>,
}

impl RegistryLayer {
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }

    pub fn with_registry(registry: &'static Registry) -> Self {
        Self {
            registry,
            fallback: None,
        }
    }

    /// Logger receiving events whose target matches no registered logger
    pub fn with_fallback(mut self, logger: Logger) -> Self {
        self.fallback = Some(logger);
        self
    }

    fn logger_for(&self, target: &str) -> Option<Logger> {
        self.registry
            .lookup_nearest(&target.replace("::", "."))
            .or_else(|| self.fallback.clone())
    }
}

impl Default for RegistryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Subscriber> Layer<S> for RegistryLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target == OWN_TARGET || target.starts_with("easylogger::") {
            return;
        }
        let Some(logger) = self.logger_for(target) else {
            return;
        };
        let level = Level::from(*metadata.level());
        if !logger.is_enabled_for(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        logger.log(level, visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    fn registry() -> &'static Registry {
        Box::leak(Box::new(Registry::new()))
    }

    #[test]
    fn test_events_reach_nearest_logger() {
        let registry = registry();
        let logger = registry.get("billing");
        logger.set_level(Level::Info);
        let sink = Arc::new(MemorySink::new(Level::Debug));
        logger.add_sink(sink.clone());

        let subscriber =
            tracing_subscriber::registry().with(RegistryLayer::with_registry(registry));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "billing::db", amount = 5, "charged card");
            tracing::debug!(target: "billing::db", "below threshold");
            tracing::info!(target: "shipping", "no logger registered");
        });

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "billing");
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "charged card amount=5");
    }

    #[test]
    fn test_fallback_and_own_events() {
        let registry = registry();
        let fallback = registry.get("catch_all");
        fallback.set_level(Level::Debug);
        let sink = Arc::new(MemorySink::new(Level::Debug));
        fallback.add_sink(sink.clone());

        let layer = RegistryLayer::with_registry(registry).with_fallback(fallback);
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "elsewhere", "disk almost full");
            tracing::warn!(target: "easylogger::sink", "ignored");
        });

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warning);
        assert_eq!(records[0].message, "disk almost full");
    }
}
