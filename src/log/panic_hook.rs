//! Reports panics through a logger

use crate::level::Level;
use crate::registry::Logger;
use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};
use std::thread;

/// Replaces the panic hook with one logging at error level to `logger`
pub fn install(logger: Logger) {
    panic::set_hook(Box::new(move |info| {
        logger.log(Level::Error, panic_message(info));
    }));
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = match info.payload().downcast_ref::<&'static str>() {
        Some(s) => *s,
        None => match info.payload().downcast_ref::<String>() {
            Some(s) => s.as_str(),
            None => "Box<dyn Any>",
        },
    };
    let location = info
        .location()
        .map(|location| location.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let thread = thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");
    let backtrace = Backtrace::force_capture();

    format!(
        "Uncaught exception\nThread '{thread_name}' panicked at '{payload}', {location}\n\
         Backtrace:\n{backtrace}"
    )
}
