use thiserror::Error;

use crate::error::{IndexError, StorageError, ToolError};

/// Per-document failures. None of these stop the batch; each is logged and
/// collected in the run summary.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{document}: conversion to PDF failed: {source}")]
    ConversionFailed {
        document: String,
        #[source]
        source: ToolError,
    },

    #[error("{document}: OCR failed: {source}")]
    OcrFailed {
        document: String,
        #[source]
        source: ToolError,
    },

    #[error("{document}: signing failed: {source}")]
    SigningFailed {
        document: String,
        #[source]
        source: ToolError,
    },

    #[error("{document}: signature could not be fully verified: {reason}")]
    VerificationIncomplete { document: String, reason: String },

    #[error("{document}: could not be removed: {source}")]
    CleanupIoFailure {
        document: String,
        #[source]
        source: StorageError,
    },

    #[error("{document}: index generation failed: {source}")]
    IndexGenerationFailed {
        document: String,
        #[source]
        source: IndexError,
    },
}

impl PipelineError {
    pub fn document(&self) -> &str {
        match self {
            PipelineError::ConversionFailed { document, .. }
            | PipelineError::OcrFailed { document, .. }
            | PipelineError::SigningFailed { document, .. }
            | PipelineError::VerificationIncomplete { document, .. }
            | PipelineError::CleanupIoFailure { document, .. }
            | PipelineError::IndexGenerationFailed { document, .. } => document,
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::ConversionFailed { .. } => "convert",
            PipelineError::OcrFailed { .. } => "ocr",
            PipelineError::SigningFailed { .. } => "sign",
            PipelineError::VerificationIncomplete { .. } => "verify",
            PipelineError::CleanupIoFailure { .. } => "cleanup",
            PipelineError::IndexGenerationFailed { .. } => "index",
        }
    }

    /// Warnings leave the document's outcome untouched.
    pub fn is_warning(&self) -> bool {
        matches!(self, PipelineError::VerificationIncomplete { .. })
    }
}
