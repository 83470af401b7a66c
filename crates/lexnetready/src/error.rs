use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexnetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Preflight(#[from] crate::preflight::PreflightError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("All documents must be in the same folder: expected '{expected}', got '{found}'")]
    MixedDirectories { expected: PathBuf, found: PathBuf },

    #[error("Document has no parent directory: {0}")]
    NoParentDirectory(PathBuf),

    #[error("Failed to resolve document path '{path}': {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{rejected}' and '{existing}' would both be written as '{output}'")]
    NameCollision {
        existing: PathBuf,
        rejected: PathBuf,
        output: String,
    },

    #[error("Document is not part of the batch: {0}")]
    UnknownDocument(PathBuf),

    #[error("The batch has no documents")]
    Empty,
}

/// Failure reported by an external tool adapter.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unsupported document format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", describe_exit(.exit_code))]
    ExitStatus {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{program} reported success but did not produce '{path}'")]
    MissingOutput { program: String, path: PathBuf },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output directory is in use by another run (lock file '{0}' exists)")]
    Locked(PathBuf),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker thread panicked")]
    Panicked,
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to lay out index PDF: {0}")]
    Render(#[from] lopdf::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, LexnetError>;
