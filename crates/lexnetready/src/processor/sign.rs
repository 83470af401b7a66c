use std::path::Path;
use std::process::Command;

use crate::config::SignerConfig;
use crate::error::ToolError;
use crate::processor::command::{discard_partial_output, require_output, run_tool};
use crate::processor::Signer;

/// AutoFirma in command-line mode with interactive certificate selection.
///
/// The call blocks until the operator picks a certificate (or cancels) in
/// AutoFirma's own dialog; cancellation surfaces as a non-zero exit.
pub struct AutoFirmaSigner {
    java: String,
    jar: String,
    store: String,
    format: String,
}

impl AutoFirmaSigner {
    pub fn new(config: &SignerConfig) -> Self {
        Self {
            java: config.java.clone(),
            jar: config.jar.clone(),
            store: config.store.clone(),
            format: config.format.clone(),
        }
    }

    pub(crate) fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-jar")
            .arg(&self.jar)
            .arg("sign")
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("-store")
            .arg(&self.store)
            .arg("-certgui")
            .arg("-format")
            .arg(&self.format);
        cmd
    }
}

impl Signer for AutoFirmaSigner {
    fn sign(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let _span = tracing::info_span!("processor.sign").entered();

        let result = run_tool(self.command(input, output), &self.java)
            .and_then(|_| require_output(&self.java, output));

        if result.is_err() {
            discard_partial_output(output);
        }
        result
    }
}
