use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::naming;

/// Position of a document in the per-document state machine.
///
/// Stages only move forward; `Signed`/`SigningSkipped` and
/// `Verified`/`VerificationFailed` are alternatives at the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    Pending,
    Converted,
    OcrProcessed,
    Signed,
    SigningSkipped,
    Verified,
    VerificationFailed,
    Terminal,
}

impl DocumentStage {
    fn step(self) -> u8 {
        match self {
            DocumentStage::Pending => 0,
            DocumentStage::Converted => 1,
            DocumentStage::OcrProcessed => 2,
            DocumentStage::Signed | DocumentStage::SigningSkipped => 3,
            DocumentStage::Verified | DocumentStage::VerificationFailed => 4,
            DocumentStage::Terminal => 5,
        }
    }
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStage::Pending => write!(f, "Pending"),
            DocumentStage::Converted => write!(f, "Converted"),
            DocumentStage::OcrProcessed => write!(f, "OCR processed"),
            DocumentStage::Signed => write!(f, "Signed"),
            DocumentStage::SigningSkipped => write!(f, "Signing skipped"),
            DocumentStage::Verified => write!(f, "Verified"),
            DocumentStage::VerificationFailed => write!(f, "Verification failed"),
            DocumentStage::Terminal => write!(f, "Terminal"),
        }
    }
}

/// How a document left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOutcome {
    ConversionFailed,
    OcrFailed,
    /// Not selected for signing; the archival PDF is the final artifact.
    Unsigned,
    /// Signing was attempted and failed; the archival PDF stays.
    SigningFailed,
    Signed,
}

impl DocumentOutcome {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            DocumentOutcome::ConversionFailed
                | DocumentOutcome::OcrFailed
                | DocumentOutcome::SigningFailed
        )
    }
}

/// Signer identity and time pulled from the inspector's report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignatureDetails {
    pub common_name: Option<String>,
    pub signing_time: Option<String>,
}

impl SignatureDetails {
    pub const NOT_DETECTED: &'static str = "not detected";

    pub fn is_complete(&self) -> bool {
        self.common_name.is_some() && self.signing_time.is_some()
    }

    pub fn common_name_or_placeholder(&self) -> &str {
        self.common_name.as_deref().unwrap_or(Self::NOT_DETECTED)
    }

    pub fn signing_time_or_placeholder(&self) -> &str {
        self.signing_time.as_deref().unwrap_or(Self::NOT_DETECTED)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    source_path: PathBuf,
    sign_intent: bool,
    stage: DocumentStage,
    outcome: Option<DocumentOutcome>,
    derived_pdf_path: Option<PathBuf>,
    signed_pdf_path: Option<PathBuf>,
    signature: Option<SignatureDetails>,
}

impl Document {
    /// New documents are selected for signing.
    pub(crate) fn new(source_path: PathBuf) -> Self {
        Self {
            source_path,
            sign_intent: true,
            stage: DocumentStage::Pending,
            outcome: None,
            derived_pdf_path: None,
            signed_pdf_path: None,
            signature: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn file_name(&self) -> String {
        naming::file_label(&self.source_path)
    }

    pub fn sign_intent(&self) -> bool {
        self.sign_intent
    }

    pub(crate) fn set_sign_intent(&mut self, sign: bool) {
        self.sign_intent = sign;
    }

    pub fn stage(&self) -> DocumentStage {
        self.stage
    }

    pub fn outcome(&self) -> Option<DocumentOutcome> {
        self.outcome
    }

    pub fn derived_pdf_path(&self) -> Option<&Path> {
        self.derived_pdf_path.as_deref()
    }

    pub fn signed_pdf_path(&self) -> Option<&Path> {
        self.signed_pdf_path.as_deref()
    }

    pub fn signature(&self) -> Option<&SignatureDetails> {
        self.signature.as_ref()
    }

    pub fn is_pdf(&self) -> bool {
        naming::has_pdf_extension(&self.source_path)
    }

    /// Moves the document forward. Backward or same-step moves are ignored.
    pub(crate) fn advance(&mut self, next: DocumentStage) {
        debug_assert!(
            next.step() > self.stage.step(),
            "illegal transition {:?} -> {:?}",
            self.stage,
            next
        );
        if next.step() > self.stage.step() {
            self.stage = next;
        }
    }

    pub(crate) fn finish(&mut self, outcome: DocumentOutcome) {
        self.advance(DocumentStage::Terminal);
        self.outcome = Some(outcome);
    }

    pub(crate) fn assign_derived_pdf(&mut self, path: PathBuf) {
        debug_assert!(self.derived_pdf_path.is_none(), "derived PDF assigned twice");
        if self.derived_pdf_path.is_none() {
            self.derived_pdf_path = Some(path);
        }
    }

    pub(crate) fn assign_signed_pdf(&mut self, path: PathBuf) {
        self.signed_pdf_path = Some(path);
    }

    pub(crate) fn record_signature(&mut self, details: SignatureDetails) {
        self.signature = Some(details);
    }

    /// Back to `Pending` with no artifacts, ready for another run.
    pub(crate) fn reset(&mut self) {
        self.stage = DocumentStage::Pending;
        self.outcome = None;
        self.derived_pdf_path = None;
        self.signed_pdf_path = None;
        self.signature = None;
    }
}
