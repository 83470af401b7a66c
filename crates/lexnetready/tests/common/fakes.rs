//! In-process fakes for the converter, OCR, signer and inspector.
//!
//! All four traits are implemented on one cloneable `FakeTools`, so a test
//! keeps a handle on the same shared state the pipeline writes to.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lexnetready::batch::naming;
use lexnetready::processor::{ArchivalOcr, Converter, SignatureInspector, Signer, ToolSet};
use lexnetready::ToolError;

pub const DEFAULT_REPORT: &str = "Digital Signature Info of: fake\n\
    Signature #1:\n\
    \x20 - Signer Certificate Common Name: TEST SIGNER\n\
    \x20 - Signing Time: Oct 14 2026 10:00:00\n";

/// One tool invocation, named by the file name of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Convert(String),
    Ocr(String),
    Sign(String),
    Inspect(String),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    fail_convert: HashSet<String>,
    fail_ocr: HashSet<String>,
    fail_sign: HashSet<String>,
    fail_inspect: bool,
    report: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeTools {
    state: Arc<Mutex<State>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool_set(&self) -> ToolSet {
        ToolSet {
            converter: Box::new(self.clone()),
            ocr: Box::new(self.clone()),
            signer: Box::new(self.clone()),
            inspector: Box::new(self.clone()),
        }
    }

    /// Conversion of the source named `name` will fail.
    pub fn fail_convert(&self, name: &str) -> &Self {
        self.state.lock().unwrap().fail_convert.insert(name.to_string());
        self
    }

    /// OCR of any input whose file name is `name` will fail.
    pub fn fail_ocr(&self, name: &str) -> &Self {
        self.state.lock().unwrap().fail_ocr.insert(name.to_string());
        self
    }

    /// Signing of the unsigned PDF named `name` will fail.
    pub fn fail_sign(&self, name: &str) -> &Self {
        self.state.lock().unwrap().fail_sign.insert(name.to_string());
        self
    }

    pub fn fail_inspect(&self) -> &Self {
        self.state.lock().unwrap().fail_inspect = true;
        self
    }

    pub fn with_report(&self, report: &str) -> &Self {
        self.state.lock().unwrap().report = Some(report.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn converted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Convert(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn signed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Sign(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn failure(program: &str, message: &str) -> ToolError {
    ToolError::ExitStatus {
        program: program.to_string(),
        exit_code: Some(1),
        stderr: message.to_string(),
    }
}

impl Converter for FakeTools {
    fn convert(&self, source: &Path, output_directory: &Path) -> Result<PathBuf, ToolError> {
        let name = naming::file_label(source);
        self.record(Call::Convert(name.clone()));
        if self.state.lock().unwrap().fail_convert.contains(&name) {
            return Err(failure("libreoffice", "source file could not be loaded"));
        }

        let out = naming::derived_pdf_path(source, output_directory);
        std::fs::write(&out, format!("%PDF-1.7 converted from {}", name)).unwrap();
        Ok(out)
    }
}

impl ArchivalOcr for FakeTools {
    fn archive(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let name = naming::file_label(input);
        self.record(Call::Ocr(name.clone()));
        if self.state.lock().unwrap().fail_ocr.contains(&name) {
            return Err(failure("ocrmypdf", "page already has text"));
        }

        std::fs::copy(input, output)
            .map_err(|e| failure("ocrmypdf", &format!("cannot write output: {}", e)))?;
        Ok(())
    }
}

impl Signer for FakeTools {
    fn sign(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let name = naming::file_label(input);
        self.record(Call::Sign(name.clone()));
        if self.state.lock().unwrap().fail_sign.contains(&name) {
            return Err(failure("java", "operation cancelled by the user"));
        }

        std::fs::copy(input, output).unwrap();
        Ok(())
    }
}

impl SignatureInspector for FakeTools {
    fn inspect(&self, signed: &Path) -> Result<String, ToolError> {
        self.record(Call::Inspect(naming::file_label(signed)));
        let state = self.state.lock().unwrap();
        if state.fail_inspect {
            return Err(failure("pdfsig", "could not open file"));
        }
        Ok(state
            .report
            .clone()
            .unwrap_or_else(|| DEFAULT_REPORT.to_string()))
    }
}
