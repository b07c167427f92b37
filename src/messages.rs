//! User-facing messages.
//!
//! The editor reports problems through a [`MessageSink`] rather than
//! printing, so a GUI can show a dialog while the CLI and tests use the
//! implementations here.

use log::{error, warn};

/// Receiver for messages meant for the user.
pub trait MessageSink {
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Forwards messages to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn warning(&mut self, message: &str) {
        warn!("{}", message);
    }

    fn error(&mut self, message: &str) {
        error!("{}", message);
    }
}

/// Keeps every message for later inspection.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CollectingSink {
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

impl MessageSink for CollectingSink {
    fn warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
