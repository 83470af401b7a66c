use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info_span};
use uuid::Uuid;

use crate::batch::{naming, Batch, Document, DocumentOutcome, DocumentStage, SignatureDetails};
use crate::error::{BatchError, Result, StorageError, ToolError};
use crate::index;
use crate::processor::ToolSet;
use crate::storage::{self, CleanupReport, OutputLock};

use super::config::PipelineConfig;
use super::context::PipelineRun;
use super::error::PipelineError;
use super::progress::{LogLine, ProgressReporter};
use super::verify::parse_signature_report;

const STAGING_PREFIX: &str = ".lexnetready-staging-";

/// What a run left behind, in addition to the per-document state in the
/// batch itself.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub output_directory: PathBuf,
    pub log: Vec<LogLine>,
    pub errors: Vec<PipelineError>,
    pub cleanup: CleanupReport,
    pub index: Option<IndexArtifact>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter().filter(|e| !e.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter().filter(|e| e.is_warning())
    }
}

/// The index file that ended up in the output directory.
#[derive(Debug, Clone, Serialize)]
pub struct IndexArtifact {
    pub path: PathBuf,
    pub signed: bool,
    pub signature: Option<SignatureDetails>,
}

enum SigningResult {
    Failed,
    Verified(SignatureDetails),
    Unverified,
}

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    tools: ToolSet,
}

impl Pipeline {
    /// Production constructor: every adapter is built from config.
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        let tools = ToolSet::from_config(&config.tools);
        Self { config, tools }
    }

    /// Inject specific adapters.
    pub fn new(config: Arc<PipelineConfig>, tools: ToolSet) -> Self {
        Self { config, tools }
    }

    /// Runs every document of `batch` through the stages, then cleanup and
    /// the index.
    ///
    /// Setup failures (empty batch, unusable output directory, lock held by
    /// another run) are returned before any document starts. Anything that
    /// goes wrong afterwards is recorded per document in the summary.
    pub fn run(
        &self,
        batch: &mut Batch,
        progress: &dyn ProgressReporter,
        cancel: &AtomicBool,
    ) -> Result<RunSummary> {
        if batch.is_empty() {
            return Err(BatchError::Empty.into());
        }
        let output_directory = batch.output_directory().ok_or(BatchError::Empty)?;

        storage::ensure_directory(&output_directory)?;
        let _lock = OutputLock::acquire(&output_directory)?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&output_directory)
            .map_err(|e| StorageError::CreateDirectory {
                path: output_directory.clone(),
                source: e,
            })?;

        let total = batch.len();
        let mut run = PipelineRun::new(total, progress);
        let _run_span = info_span!("run", run_id = %run.id, documents = total).entered();

        let tools = &self.config.tools;
        debug!(
            converter = %tools.converter.program,
            ocr = %tools.ocr.program,
            signer = %tools.signer.jar,
            inspector = %tools.inspector.program,
            "tool configuration"
        );

        batch.reset_for_run();
        run.info(format!(
            "Processing {} documents into {}",
            total,
            output_directory.display()
        ));
        run.set_progress(0.0);

        for (index, document) in batch.documents_mut().iter_mut().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                run.mark_cancelled();
                run.warn(format!(
                    "Run cancelled, {} documents not started",
                    total - index
                ));
                break;
            }

            run.document_started(index);
            run.info(format!(
                "[{}/{}] Processing {}",
                index + 1,
                total,
                document.file_name()
            ));
            self.process_document(document, &output_directory, &staging, &mut run);
            run.document_finished(index);
        }

        if let Err(e) = staging.close() {
            run.warn(format!("Could not remove staging directory: {}", e));
        }

        let cleanup = {
            let _step = info_span!("cleanup").entered();
            self.step_cleanup(&output_directory, &mut run)
        };

        let index = if !batch.generate_index() {
            None
        } else if run.is_cancelled() {
            run.warn("Index skipped because the run was cancelled");
            None
        } else {
            let _step = info_span!("index").entered();
            self.step_index(&output_directory, &mut run)
        };

        run.set_progress(100.0);
        if run.is_cancelled() {
            run.warn(format!(
                "Run cancelled. Partial results in {}",
                output_directory.display()
            ));
        } else {
            run.info(format!(
                "Process completed. Files ready in {}",
                output_directory.display()
            ));
        }
        run.finished();

        let run_id = run.id;
        let cancelled = run.is_cancelled();
        let (log, errors) = run.into_parts();
        Ok(RunSummary {
            run_id,
            output_directory,
            log,
            errors,
            cleanup,
            index,
            cancelled,
        })
    }

    fn process_document(
        &self,
        document: &mut Document,
        output_directory: &Path,
        staging: &TempDir,
        run: &mut PipelineRun,
    ) {
        let name = document.file_name();
        let _document_span = info_span!("document", file = %name).entered();

        // Artifacts of an earlier run must not outlive a failure in this one.
        let derived = naming::derived_pdf_path(document.source_path(), output_directory);
        let signed = naming::signed_pdf_path(&derived);
        self.remove_stale_artifact(&derived, run);
        self.remove_stale_artifact(&signed, run);

        // Step 1: Convert
        let ocr_input = {
            let _step = info_span!("convert").entered();
            match self.step_convert(document, staging.path(), run) {
                Ok(path) => path,
                Err(source) => {
                    document.finish(DocumentOutcome::ConversionFailed);
                    run.fail(PipelineError::ConversionFailed {
                        document: name,
                        source,
                    });
                    return;
                }
            }
        };
        document.advance(DocumentStage::Converted);

        // Step 2: OCR to PDF/A
        {
            let _step = info_span!("ocr").entered();
            if let Err(source) = self.tools.ocr.archive(&ocr_input, &derived) {
                document.finish(DocumentOutcome::OcrFailed);
                run.fail(PipelineError::OcrFailed {
                    document: name,
                    source,
                });
                return;
            }
            run.info("  → PDF/A with OCR generated");
        }
        document.assign_derived_pdf(derived.clone());
        document.advance(DocumentStage::OcrProcessed);

        // Step 3+4: Sign and verify
        let _step = info_span!("sign").entered();
        if !document.sign_intent() {
            document.advance(DocumentStage::SigningSkipped);
            document.finish(DocumentOutcome::Unsigned);
            run.info(format!(
                "  {} not marked for signing (converted only)",
                naming::file_label(&derived)
            ));
            return;
        }

        match self.sign_and_verify(&derived, &signed, run) {
            SigningResult::Failed => {
                document.advance(DocumentStage::SigningSkipped);
                document.finish(DocumentOutcome::SigningFailed);
            }
            SigningResult::Verified(details) => {
                document.assign_signed_pdf(signed);
                document.advance(DocumentStage::Signed);
                document.record_signature(details);
                document.advance(DocumentStage::Verified);
                document.finish(DocumentOutcome::Signed);
            }
            SigningResult::Unverified => {
                document.assign_signed_pdf(signed);
                document.advance(DocumentStage::Signed);
                document.advance(DocumentStage::VerificationFailed);
                document.finish(DocumentOutcome::Signed);
            }
        }
    }

    /// PDFs go to OCR as they are; everything else is converted into the
    /// staging directory first.
    fn step_convert(
        &self,
        document: &Document,
        staging: &Path,
        run: &mut PipelineRun,
    ) -> std::result::Result<PathBuf, ToolError> {
        if document.is_pdf() {
            debug!("source is already a PDF, skipping conversion");
            return Ok(document.source_path().to_path_buf());
        }

        let converted = self.tools.converter.convert(document.source_path(), staging)?;
        run.info("  → Converted to PDF");
        Ok(converted)
    }

    /// A file from an earlier run would otherwise be cleaned up against, or
    /// listed in the index for, a document that failed this time.
    fn remove_stale_artifact(&self, path: &Path, run: &mut PipelineRun) {
        match storage::remove_if_exists(path) {
            Ok(true) => debug!(file = %naming::file_label(path), "removed stale artifact"),
            Ok(false) => {}
            Err(source) => run.fail(PipelineError::CleanupIoFailure {
                document: naming::file_label(path),
                source,
            }),
        }
    }

    fn sign_and_verify(
        &self,
        unsigned: &Path,
        signed: &Path,
        run: &mut PipelineRun,
    ) -> SigningResult {
        let unsigned_name = naming::file_label(unsigned);
        let signed_name = naming::file_label(signed);

        run.info(format!("Signing {}...", unsigned_name));
        if let Err(source) = self.tools.signer.sign(unsigned, signed) {
            run.fail(PipelineError::SigningFailed {
                document: unsigned_name,
                source,
            });
            return SigningResult::Failed;
        }

        let _step = info_span!("verify").entered();
        match self.tools.inspector.inspect(signed) {
            Ok(report) => {
                let details = parse_signature_report(&report);
                run.info(format!(
                    "  ✓ Verified: {} (CN: {}, signing time: {})",
                    signed_name,
                    details.common_name_or_placeholder(),
                    details.signing_time_or_placeholder()
                ));
                if !details.is_complete() {
                    run.fail(PipelineError::VerificationIncomplete {
                        document: signed_name,
                        reason: missing_fields(&details),
                    });
                }
                SigningResult::Verified(details)
            }
            Err(e) => {
                run.fail(PipelineError::VerificationIncomplete {
                    document: signed_name,
                    reason: e.to_string(),
                });
                SigningResult::Unverified
            }
        }
    }

    fn step_cleanup(&self, output_directory: &Path, run: &mut PipelineRun) -> CleanupReport {
        let mut report = match storage::reconcile_signed(output_directory) {
            Ok(report) => report,
            Err(source) => {
                run.fail(PipelineError::CleanupIoFailure {
                    document: naming::file_label(output_directory),
                    source,
                });
                return CleanupReport::default();
            }
        };

        for name in &report.removed {
            run.info(format!("  → Removed unsigned original {}", name));
        }
        for source in report.failed.drain(..) {
            let document = match &source {
                StorageError::RemoveFile { path, .. } => naming::file_label(path),
                _ => naming::file_label(output_directory),
            };
            run.fail(PipelineError::CleanupIoFailure { document, source });
        }
        report
    }

    fn step_index(&self, output_directory: &Path, run: &mut PipelineRun) -> Option<IndexArtifact> {
        let footer = &self.config.index_footer;
        let unsigned = match index::write_index(output_directory, footer) {
            Ok(path) => path,
            Err(source) => {
                run.fail(PipelineError::IndexGenerationFailed {
                    document: index::INDEX_FILE_NAME.to_string(),
                    source,
                });
                return None;
            }
        };
        run.info(format!(
            "Index '{}' created over the final state",
            index::INDEX_FILE_NAME
        ));

        let signed = naming::signed_pdf_path(&unsigned);
        self.remove_stale_artifact(&signed, run);

        let artifact = match self.sign_and_verify(&unsigned, &signed, run) {
            SigningResult::Failed => {
                return Some(IndexArtifact {
                    path: unsigned,
                    signed: false,
                    signature: None,
                });
            }
            SigningResult::Verified(details) => IndexArtifact {
                path: signed,
                signed: true,
                signature: Some(details),
            },
            SigningResult::Unverified => IndexArtifact {
                path: signed,
                signed: true,
                signature: None,
            },
        };

        if let Err(source) = storage::remove_if_exists(&unsigned) {
            run.fail(PipelineError::CleanupIoFailure {
                document: index::INDEX_FILE_NAME.to_string(),
                source,
            });
        }
        Some(artifact)
    }
}

fn missing_fields(details: &SignatureDetails) -> String {
    match (&details.common_name, &details.signing_time) {
        (None, None) => "signer common name and signing time not detected".to_string(),
        (None, Some(_)) => "signer common name not detected".to_string(),
        (Some(_), None) => "signing time not detected".to_string(),
        (Some(_), Some(_)) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::LexnetError;
    use crate::pipeline::progress::NoopProgress;
    use crate::processor::{ArchivalOcr, Converter, SignatureInspector, Signer};
    use tempfile::TempDir;

    struct CopyConverter;

    impl Converter for CopyConverter {
        fn convert(
            &self,
            source: &Path,
            output_directory: &Path,
        ) -> std::result::Result<PathBuf, ToolError> {
            let out = naming::derived_pdf_path(source, output_directory);
            std::fs::write(&out, b"%PDF-1.7 converted").unwrap();
            Ok(out)
        }
    }

    struct CopyOcr;

    impl ArchivalOcr for CopyOcr {
        fn archive(&self, input: &Path, output: &Path) -> std::result::Result<(), ToolError> {
            std::fs::copy(input, output).unwrap();
            Ok(())
        }
    }

    struct CopySigner;

    impl Signer for CopySigner {
        fn sign(&self, input: &Path, output: &Path) -> std::result::Result<(), ToolError> {
            std::fs::copy(input, output).unwrap();
            Ok(())
        }
    }

    struct FixedInspector(&'static str);

    impl SignatureInspector for FixedInspector {
        fn inspect(&self, _signed: &Path) -> std::result::Result<String, ToolError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenInspector;

    impl SignatureInspector for BrokenInspector {
        fn inspect(&self, _signed: &Path) -> std::result::Result<String, ToolError> {
            Err(ToolError::Spawn {
                program: "pdfsig".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    const FULL_REPORT: &str =
        "Signer Certificate Common Name: TEST SIGNER\nSigning Time: Oct 14 2026 09:00:00\n";

    fn pipeline(inspector: Box<dyn SignatureInspector>) -> Pipeline {
        let config = Arc::new(PipelineConfig::from_config(&Config::default()));
        Pipeline::new(
            config,
            ToolSet {
                converter: Box::new(CopyConverter),
                ocr: Box::new(CopyOcr),
                signer: Box::new(CopySigner),
                inspector,
            },
        )
    }

    fn batch_with(dir: &Path, names: &[&str]) -> Batch {
        let mut batch = Batch::new();
        let paths: Vec<PathBuf> = names
            .iter()
            .map(|name| {
                let path = dir.join(name);
                std::fs::write(&path, b"%PDF-1.7 source").unwrap();
                path
            })
            .collect();
        batch.add_documents(paths).unwrap();
        batch
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let pipeline = pipeline(Box::new(FixedInspector(FULL_REPORT)));
        let mut batch = Batch::new();

        let result = pipeline.run(&mut batch, &NoopProgress, &AtomicBool::new(false));
        match result {
            Err(LexnetError::Batch(BatchError::Empty)) => {}
            _ => panic!("Expected empty batch error"),
        }
    }

    #[test]
    fn test_held_lock_fails_before_processing() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Box::new(FixedInspector(FULL_REPORT)));
        let mut batch = batch_with(dir.path(), &["a.pdf"]);

        let output = batch.output_directory().unwrap();
        storage::ensure_directory(&output).unwrap();
        let _held = OutputLock::acquire(&output).unwrap();

        let result = pipeline.run(&mut batch, &NoopProgress, &AtomicBool::new(false));
        match result {
            Err(LexnetError::Storage(StorageError::Locked(_))) => {}
            _ => panic!("Expected locked output directory"),
        }
        assert_eq!(batch.documents()[0].stage(), DocumentStage::Pending);
        assert!(!output.join("a.pdf").exists());
    }

    #[test]
    fn test_signed_document_is_verified() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Box::new(FixedInspector(FULL_REPORT)));
        let mut batch = batch_with(dir.path(), &["a.pdf"]);
        batch.set_generate_index(false);

        let summary = pipeline
            .run(&mut batch, &NoopProgress, &AtomicBool::new(false))
            .unwrap();

        let doc = &batch.documents()[0];
        assert_eq!(doc.stage(), DocumentStage::Terminal);
        assert_eq!(doc.outcome(), Some(DocumentOutcome::Signed));
        assert_eq!(
            doc.signature().and_then(|s| s.common_name.as_deref()),
            Some("TEST SIGNER")
        );
        assert!(summary.errors.is_empty());
        assert!(summary.index.is_none());
        assert!(!summary.cancelled);
        assert!(summary.output_directory.join("a_firmado.pdf").exists());
        assert!(!summary.output_directory.join("a.pdf").exists());
    }

    #[test]
    fn test_incomplete_report_is_a_warning() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Box::new(FixedInspector("Signing Time: now\n")));
        let mut batch = batch_with(dir.path(), &["a.pdf"]);
        batch.set_generate_index(false);

        let summary = pipeline
            .run(&mut batch, &NoopProgress, &AtomicBool::new(false))
            .unwrap();

        assert_eq!(batch.documents()[0].outcome(), Some(DocumentOutcome::Signed));
        assert_eq!(summary.failures().count(), 0);
        let warnings: Vec<&PipelineError> = summary.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("common name not detected"));
    }

    #[test]
    fn test_inspector_failure_keeps_signed_outcome() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Box::new(BrokenInspector));
        let mut batch = batch_with(dir.path(), &["a.pdf"]);
        batch.set_generate_index(false);

        let summary = pipeline
            .run(&mut batch, &NoopProgress, &AtomicBool::new(false))
            .unwrap();

        let doc = &batch.documents()[0];
        assert_eq!(doc.outcome(), Some(DocumentOutcome::Signed));
        assert!(doc.signature().is_none());
        assert!(doc.signed_pdf_path().is_some());
        assert_eq!(summary.warnings().count(), 1);
    }

    #[test]
    fn test_staging_directory_is_removed() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline(Box::new(FixedInspector(FULL_REPORT)));
        let mut batch = batch_with(dir.path(), &["b.docx"]);
        batch.set_generate_index(false);

        let summary = pipeline
            .run(&mut batch, &NoopProgress, &AtomicBool::new(false))
            .unwrap();

        let leftovers: Vec<String> = std::fs::read_dir(&summary.output_directory)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(leftovers, vec!["b_firmado.pdf"]);
    }
}
