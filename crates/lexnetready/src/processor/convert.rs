use std::path::{Path, PathBuf};
use std::process::Command;

use crate::batch::naming;
use crate::config::ConverterConfig;
use crate::error::ToolError;
use crate::processor::command::{require_output, run_tool};
use crate::processor::Converter;

/// Headless LibreOffice (`soffice`) PDF export.
pub struct LibreOfficeConverter {
    program: String,
    extensions: Vec<String>,
}

impl LibreOfficeConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn supports(&self, source: &Path) -> bool {
        source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|s| s.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }

    pub(crate) fn command(&self, source: &Path, output_directory: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--headless")
            .args(["--convert-to", "pdf"])
            .arg("--outdir")
            .arg(output_directory)
            .arg(source);
        cmd
    }
}

impl Converter for LibreOfficeConverter {
    fn convert(&self, source: &Path, output_directory: &Path) -> Result<PathBuf, ToolError> {
        let _span = tracing::info_span!("processor.convert").entered();

        if !self.supports(source) {
            let ext = source
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(ToolError::UnsupportedFormat(ext));
        }

        run_tool(self.command(source, output_directory), &self.program)?;

        let produced = naming::derived_pdf_path(source, output_directory);
        require_output(&self.program, &produced)?;
        Ok(produced)
    }
}
