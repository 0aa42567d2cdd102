//! Template-level logging
//!
//! The `log` helper and [`HelperOptions::log`](crate::hbs::render::HelperOptions::log) route
//! messages through a [`Logger`]. A registered callback receives the raw level and arguments.
//! Without one, messages go to the `log` facade under the `hbs` target, so they only show up
//! when the host installed a logging backend.

use hbs_dom::dom::{Array, Value};
use std::fmt;
use std::sync::Arc;

/// Callback receiving `(level, args)`
pub type LogCallback = dyn Fn(&Value, &Array) + Send + Sync;

const LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

/// Map a level value to an index into `debug`, `info`, `warn`, `error`
///
/// Accepts level names (case-insensitive), numeric strings and integers. Anything else maps to
/// `info`.
pub fn lookup_level(level: &Value) -> usize {
    match level {
        Value::Integer(i) => (*i).clamp(0, 3) as usize,
        Value::String(s) | Value::SafeString(s) => {
            let lower = s.to_ascii_lowercase();
            LEVELS
                .iter()
                .position(|name| *name == lower)
                .or_else(|| lower.parse::<usize>().ok().map(|n| n.min(3)))
                .unwrap_or(1)
        }
        _ => 1,
    }
}

#[derive(Clone, Default)]
pub struct Logger {
    callback: Option<Arc<LogCallback>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<F>(&mut self, callback: F)
    where
        F: Fn(&Value, &Array) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
    }

    pub fn clear(&mut self) {
        self.callback = None;
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    pub fn log(&self, level: &Value, args: &Array) {
        match &self.callback {
            Some(callback) => callback(level, args),
            None => forward(level, args),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

fn message_text(args: &Array) -> String {
    args.iter()
        .map(|arg| match &arg {
            Value::String(s) | Value::SafeString(s) => s.to_string(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn forward(level: &Value, args: &Array) {
    let message = message_text(args);
    match lookup_level(level) {
        0 => log::debug!(target: "hbs", "{}", message),
        1 => log::info!(target: "hbs", "{}", message),
        2 => log::warn!(target: "hbs", "{}", message),
        _ => log::error!(target: "hbs", "{}", message),
    }
}
