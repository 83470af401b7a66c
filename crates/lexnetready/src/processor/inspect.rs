use std::path::Path;
use std::process::Command;

use crate::config::InspectorConfig;
use crate::error::ToolError;
use crate::processor::command::run_tool;
use crate::processor::SignatureInspector;

/// Poppler's `pdfsig`; the report is parsed by the pipeline.
pub struct PdfSig {
    program: String,
}

impl PdfSig {
    pub fn new(config: &InspectorConfig) -> Self {
        Self {
            program: config.program.clone(),
        }
    }
}

impl SignatureInspector for PdfSig {
    fn inspect(&self, signed: &Path) -> Result<String, ToolError> {
        let _span = tracing::info_span!("processor.inspect").entered();

        let mut cmd = Command::new(&self.program);
        cmd.arg(signed);
        let output = run_tool(cmd, &self.program)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
