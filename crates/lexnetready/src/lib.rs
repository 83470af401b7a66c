pub mod batch;
pub mod config;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod preflight;
pub mod processor;
pub mod storage;
pub mod worker;

pub use batch::{AddReport, Batch, Document, DocumentOutcome, DocumentStage, SignatureDetails};
pub use config::{load_config, load_config_or_default, Config, ToolsConfig};
pub use error::{
    BatchError, ConfigError, IndexError, LexnetError, Result, StorageError, ToolError, WorkerError,
};
pub use pipeline::{
    Pipeline, PipelineConfig, PipelineError, ProgressReporter, RunEvent, RunSummary,
};
pub use preflight::{check_dependencies, PreflightError};
pub use worker::{spawn_run, RunHandle, RunOutput};
