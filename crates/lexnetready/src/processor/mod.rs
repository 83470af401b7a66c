pub(crate) mod command;
pub mod convert;
pub mod inspect;
pub mod ocr;
pub mod sign;

use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;
use crate::error::ToolError;

pub use convert::LibreOfficeConverter;
pub use inspect::PdfSig;
pub use ocr::OcrMyPdf;
pub use sign::AutoFirmaSigner;

/// Office document to PDF.
pub trait Converter: Send + Sync {
    /// Writes `<stem>.pdf` into `output_directory` and returns its path.
    fn convert(&self, source: &Path, output_directory: &Path) -> Result<PathBuf, ToolError>;
}

/// PDF to OCR'd PDF/A. `output` must only exist afterwards on success.
pub trait ArchivalOcr: Send + Sync {
    fn archive(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// PAdES signature of `input` written to `output`.
pub trait Signer: Send + Sync {
    fn sign(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Textual signature report for a signed PDF.
pub trait SignatureInspector: Send + Sync {
    fn inspect(&self, signed: &Path) -> Result<String, ToolError>;
}

/// The four adapters a run needs.
pub struct ToolSet {
    pub converter: Box<dyn Converter>,
    pub ocr: Box<dyn ArchivalOcr>,
    pub signer: Box<dyn Signer>,
    pub inspector: Box<dyn SignatureInspector>,
}

impl ToolSet {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            converter: Box::new(LibreOfficeConverter::new(&config.converter)),
            ocr: Box::new(OcrMyPdf::new(&config.ocr)),
            signer: Box::new(AutoFirmaSigner::new(&config.signer)),
            inspector: Box::new(PdfSig::new(&config.inspector)),
        }
    }
}
