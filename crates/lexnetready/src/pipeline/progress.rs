use chrono::{DateTime, Local};
use crossbeam_channel::Sender;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One operator-facing line of the run log.
#[derive(Debug, Clone, Serialize)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

/// Events emitted by the pipeline while a run is in progress.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Log(LogLine),
    /// Overall completion in percent, never decreasing within a run.
    Progress(f64),
    Finished,
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: RunEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: RunEvent) {}
}

/// Forwards events to the interaction surface over a channel.
pub struct ChannelProgress {
    sender: Sender<RunEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<RunEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, event: RunEvent) {
        // A closed receiver means nobody is watching; the run goes on.
        let _ = self.sender.send(event);
    }
}
