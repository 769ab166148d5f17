//! Scoped diagnostic reporting.

use std::error::Error;

use playspace_space::{ErrorReport, HostHandle};

/// Collects diagnostic reports about one subject and hands them to the
/// host when dropped.
///
/// Reports are buffered so a burst of related failures reaches the host
/// together. Dropping the reporter is what releases it; there is no
/// separate close step to forget.
pub struct ErrorReporter {
    host: HostHandle,
    subject: String,
    pending: Vec<ErrorReport>,
}

impl ErrorReporter {
    pub fn open(host: HostHandle, subject: impl Into<String>) -> Self {
        Self {
            host,
            subject: subject.into(),
            pending: Vec::new(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Number of reports not yet handed to the host.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Records `error`, including its chain of sources.
    pub fn report(&mut self, error: &(dyn Error + 'static), context: impl Into<String>) {
        self.report_message(context, error_chain(error));
    }

    pub fn report_message(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.pending.push(ErrorReport {
            subject: self.subject.clone(),
            context: context.into(),
            error: message.into(),
        });
    }
}

impl Drop for ErrorReporter {
    fn drop(&mut self) {
        for report in self.pending.drain(..) {
            self.host.report_error(&report);
        }
    }
}

impl std::fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("subject", &self.subject)
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Formats an error and its sources, outermost first.
///
/// A source already spelled out by the message above it is skipped.
pub(crate) fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str("\ncaused by: ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
