use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::MergeError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MergeSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (nothing to merge, operator action needed).
    Warning,
    /// Error-level event (a logger file is malformed).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl MergeSeverity {
    /// Severity used when a merge fails with `error`.
    pub fn for_error(error: &MergeError) -> Self {
        match error {
            MergeError::Io(_) => MergeSeverity::Critical,
            MergeError::EmptyInput => MergeSeverity::Warning,
            MergeError::Schema { .. }
            | MergeError::Parse { .. }
            | MergeError::Coercion { .. }
            | MergeError::Export(_)
            | MergeError::UnsupportedValue { .. } => MergeSeverity::Error,
        }
    }
}

/// Context about a merge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeContext {
    /// Names of the input files, in merge order.
    pub files: Vec<String>,
}

/// Stats reported after one logger file is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    /// Data rows read from the file (blank lines excluded).
    pub rows: usize,
    /// Columns in the file's header.
    pub columns: usize,
}

/// Stats reported on a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Number of files merged.
    pub files: usize,
    /// Rows read across all files.
    pub rows_read: usize,
    /// Rows discarded because their date was missing.
    pub rows_dropped: usize,
    /// Rows in the merged dataset.
    pub rows: usize,
}

/// Observer interface for merge outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait MergeObserver: Send + Sync {
    /// Called after each logger file is parsed.
    fn on_file_parsed(&self, _file: &str, _stats: FileStats) {}

    /// Called when a merge succeeds.
    fn on_success(&self, _ctx: &MergeContext, _stats: MergeStats) {}

    /// Called when a merge fails.
    fn on_failure(&self, _ctx: &MergeContext, _severity: MergeSeverity, _error: &MergeError) {}

    /// Called when a merge failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &MergeContext, severity: MergeSeverity, error: &MergeError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn MergeObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn MergeObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl MergeObserver for CompositeObserver {
    fn on_file_parsed(&self, file: &str, stats: FileStats) {
        for o in &self.observers {
            o.on_file_parsed(file, stats);
        }
    }

    fn on_success(&self, ctx: &MergeContext, stats: MergeStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &MergeContext, severity: MergeSeverity, error: &MergeError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &MergeContext, severity: MergeSeverity, error: &MergeError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards merge events to the `tracing` facade.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl MergeObserver for TracingObserver {
    fn on_file_parsed(&self, file: &str, stats: FileStats) {
        info!(file, rows = stats.rows, columns = stats.columns, "logger file parsed");
    }

    fn on_success(&self, ctx: &MergeContext, stats: MergeStats) {
        info!(
            files = ctx.files.len(),
            rows_read = stats.rows_read,
            rows_dropped = stats.rows_dropped,
            rows = stats.rows,
            "merge finished"
        );
    }

    fn on_failure(&self, ctx: &MergeContext, severity: MergeSeverity, error: &MergeError) {
        warn!(?severity, files = ?ctx.files, %error, "merge failed");
    }

    fn on_alert(&self, ctx: &MergeContext, severity: MergeSeverity, error: &MergeError) {
        error!(?severity, files = ?ctx.files, %error, "merge alert");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_and_mapping() {
        assert!(MergeSeverity::Critical > MergeSeverity::Error);
        assert!(MergeSeverity::Error > MergeSeverity::Warning);
        assert_eq!(
            MergeSeverity::for_error(&MergeError::EmptyInput),
            MergeSeverity::Warning
        );
        let io = MergeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(MergeSeverity::for_error(&io), MergeSeverity::Critical);
        let schema = MergeError::Schema {
            file: "a".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(MergeSeverity::for_error(&schema), MergeSeverity::Error);
    }
}
