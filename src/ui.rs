use crate::errors::{AppError, AppResult};
use crate::progress::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::debug;

/// Creates a progress bar with the standard application styling.
pub fn create_progress_bar(total: u64) -> AppResult<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
            )
            .map_err(|e| AppError::IoError(format!("Failed to create progress bar template: {e}")))?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Progress reporter backed by an indicatif bar, for interactive runs.
pub struct BarReporter {
    pb: ProgressBar,
}

impl BarReporter {
    pub fn new(total: u64) -> AppResult<Self> {
        Ok(Self {
            pb: create_progress_bar(total)?,
        })
    }

    pub fn finish(&self, message: String) {
        self.pb.finish_with_message(message);
    }
}

impl ProgressReporter for BarReporter {
    fn on_progress(&self, completed: usize, _total: usize, description: &str) {
        self.pb.set_position(completed as u64);
        self.pb.set_message(description.to_string());
    }

    fn on_file_written(&self, path: &Path) {
        debug!(file = %path.display(), "File written");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_reporter_tracks_position() {
        let reporter = BarReporter::new(3).unwrap();
        reporter.on_progress(1, 3, "first");
        reporter.on_progress(2, 3, "second");
        reporter.on_file_written(Path::new("a.csv"));
        reporter.finish("done".to_string());
    }
}
