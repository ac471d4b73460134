//! Reporting capability handed to the resolver in place of a global logger.

use tracing::{info, warn};

pub trait Reporter {
    /// Non-fatal problem, such as a member whose parent is unknown.
    fn warn(&self, message: &str);

    /// Progress information.
    fn inform(&self, message: &str);
}

/// Forwards reports to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn inform(&self, message: &str) {
        info!("{}", message);
    }
}

/// Keeps every report in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub warnings: std::cell::RefCell<Vec<String>>,
    pub notes: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn inform(&self, message: &str) {
        self.notes.borrow_mut().push(message.to_string());
    }
}
