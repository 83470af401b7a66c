pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod runner;
pub mod verify;

pub use config::PipelineConfig;
pub use context::PipelineRun;
pub use error::PipelineError;
pub use progress::{ChannelProgress, LogLevel, LogLine, NoopProgress, ProgressReporter, RunEvent};
pub use runner::{IndexArtifact, Pipeline, RunSummary};
pub use verify::parse_signature_report;
