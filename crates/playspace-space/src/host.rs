//! The host server a game space runs inside.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a space needs to know about the server hosting it.
pub trait GameHost: Send + Sync + 'static {
    /// How many players the host can seat right now.
    ///
    /// This may be lower than any game's own player limit, and it may
    /// change while a space is running.
    fn connection_ceiling(&self) -> usize;

    /// Receives a diagnostic report about an unexpected failure.
    ///
    /// Default: log it at error level.
    fn report_error(&self, report: &ErrorReport) {
        tracing::error!(
            subject = %report.subject,
            context = %report.context,
            error = %report.error,
            "error report"
        );
    }
}

/// A diagnostic report about something that failed unexpectedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// What failed (e.g. a game type and the document it came from).
    pub subject: String,
    /// What was being done when it failed.
    pub context: String,
    /// The error and its sources, outermost first.
    pub error: String,
}

/// Shared handle to the host.
pub type HostHandle = Arc<dyn GameHost>;

/// An in-process host with an adjustable connection ceiling.
#[derive(Debug)]
pub struct LocalHost {
    ceiling: AtomicUsize,
}

impl LocalHost {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling: AtomicUsize::new(ceiling),
        }
    }

    /// Convenience: a new host already wrapped as a [`HostHandle`].
    pub fn handle(ceiling: usize) -> HostHandle {
        Arc::new(Self::new(ceiling))
    }

    pub fn set_connection_ceiling(&self, ceiling: usize) {
        self.ceiling.store(ceiling, Ordering::Relaxed);
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl GameHost for LocalHost {
    fn connection_ceiling(&self) -> usize {
        self.ceiling.load(Ordering::Relaxed)
    }
}
