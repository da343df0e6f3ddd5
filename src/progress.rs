use std::path::Path;
use tracing::{debug, info};

/// Observation port for run progress.
///
/// Implementations must be cheap and infallible: the executor calls them on
/// its hot path and never inspects a result. `on_progress` fires once per
/// work unit after it reaches a terminal state (including skipped units),
/// with a 1-based monotonic `completed` count. `on_file_written` fires once
/// per extracted file, in extraction order.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize, description: &str);
    fn on_file_written(&self, path: &Path);
}

/// Reporter that emits structured log lines, for non-interactive runs.
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn on_progress(&self, completed: usize, total: usize, description: &str) {
        let percentage = (completed as f64 / total as f64) * 100.0;
        info!(
            completed = completed,
            total = total,
            percentage = format!("{percentage:.1}"),
            unit = description,
            "Unit finished"
        );
    }

    fn on_file_written(&self, path: &Path) {
        debug!(file = %path.display(), "File written");
    }
}
