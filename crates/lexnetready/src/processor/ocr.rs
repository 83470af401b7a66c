use std::path::Path;
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::ToolError;
use crate::processor::command::{discard_partial_output, require_output, run_tool};
use crate::processor::ArchivalOcr;

/// `ocrmypdf`, always forcing a fresh OCR layer and PDF/A output.
pub struct OcrMyPdf {
    program: String,
    languages: Option<String>,
}

impl OcrMyPdf {
    pub fn new(config: &OcrConfig) -> Self {
        let languages = if config.languages.is_empty() {
            None
        } else {
            Some(config.languages.join("+"))
        };

        Self {
            program: config.program.clone(),
            languages,
        }
    }

    pub(crate) fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--force-ocr").args(["--output-type", "pdfa"]);
        if let Some(ref languages) = self.languages {
            cmd.arg("-l").arg(languages);
        }
        cmd.arg(input).arg(output);
        cmd
    }
}

impl ArchivalOcr for OcrMyPdf {
    fn archive(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let _span = tracing::info_span!("processor.ocr").entered();

        let result = run_tool(self.command(input, output), &self.program)
            .and_then(|_| require_output(&self.program, output));

        if result.is_err() {
            discard_partial_output(output);
        }
        result
    }
}
