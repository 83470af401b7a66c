use tracing::{error, info, warn};
use uuid::Uuid;

use super::error::PipelineError;
use super::progress::{LogLevel, LogLine, ProgressReporter, RunEvent};

/// Mutable state of one run: the append-only log, the progress high-water
/// mark and every per-document failure seen so far.
pub struct PipelineRun<'a> {
    pub id: Uuid,
    total: usize,
    log: Vec<LogLine>,
    errors: Vec<PipelineError>,
    last_percent: f64,
    cancelled: bool,
    progress: &'a dyn ProgressReporter,
}

impl<'a> PipelineRun<'a> {
    pub fn new(total: usize, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            id: Uuid::new_v4(),
            total,
            log: Vec::new(),
            errors: Vec::new(),
            last_percent: 0.0,
            cancelled: false,
            progress,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.push(LogLine::new(LogLevel::Info, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.push(LogLine::new(LogLevel::Warn, message));
    }

    /// Logs the failure with its document and stage and keeps it for the
    /// summary.
    pub fn fail(&mut self, err: PipelineError) {
        let message = format!("  × {}", err);
        if err.is_warning() {
            warn!(document = %err.document(), stage = err.stage(), "{}", err);
            self.push(LogLine::new(LogLevel::Warn, message));
        } else {
            error!(document = %err.document(), stage = err.stage(), "{}", err);
            self.push(LogLine::new(LogLevel::Error, message));
        }
        self.errors.push(err);
    }

    /// Emits `percent`, clamped so the reported value never goes back.
    pub fn set_progress(&mut self, percent: f64) {
        let clamped = percent.clamp(0.0, 100.0).max(self.last_percent);
        self.last_percent = clamped;
        self.progress.report(RunEvent::Progress(clamped));
    }

    /// Progress before document `index` (zero-based) starts.
    pub fn document_started(&mut self, index: usize) {
        self.set_progress(self.fraction(index));
    }

    pub fn document_finished(&mut self, index: usize) {
        self.set_progress(self.fraction(index + 1));
    }

    pub fn last_percent(&self) -> f64 {
        self.last_percent
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    pub fn errors(&self) -> &[PipelineError] {
        &self.errors
    }

    pub fn finished(&self) {
        self.progress.report(RunEvent::Finished);
    }

    pub fn into_parts(self) -> (Vec<LogLine>, Vec<PipelineError>) {
        (self.log, self.errors)
    }

    fn fraction(&self, done: usize) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        done as f64 / self.total as f64 * 100.0
    }

    fn push(&mut self, line: LogLine) {
        self.log.push(line.clone());
        self.progress.report(RunEvent::Log(line));
    }
}
