//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` struct owns a temporary case folder, the fake tools and
//! a pipeline wired to them, and captures every event a run emits.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use assert_fs::TempDir;

use lexnetready::pipeline::{ChannelProgress, ProgressReporter, RunEvent};
use lexnetready::storage::list_pdf_names;
use lexnetready::{Batch, Config, Pipeline, PipelineConfig, Result, RunSummary};

use super::fakes::FakeTools;

/// Everything a single run produced.
pub struct RunCapture {
    pub summary: RunSummary,
    pub events: Vec<RunEvent>,
}

impl RunCapture {
    pub fn progress(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn log_messages(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Log(line) => Some(line.message.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct TestHarness {
    /// Root of the temporary tree; the case folder lives inside it.
    pub temp_dir: TempDir,
    /// Folder holding the source documents.
    pub case_dir: PathBuf,
    pub tools: FakeTools,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let case_dir = temp_dir.path().join("case");
        std::fs::create_dir_all(&case_dir).expect("Failed to create case directory");

        Self {
            temp_dir,
            case_dir,
            tools: FakeTools::new(),
        }
    }

    /// Writes a source document into the case folder.
    pub fn source(&self, name: &str) -> PathBuf {
        let path = self.case_dir.join(name);
        std::fs::write(&path, format!("%PDF-1.7 source {}", name))
            .expect("Failed to write source document");
        path
    }

    /// A batch over freshly written sources, all selected for signing.
    pub fn batch(&self, names: &[&str]) -> Batch {
        let paths: Vec<PathBuf> = names.iter().map(|name| self.source(name)).collect();
        let mut batch = Batch::new();
        batch.add_documents(&paths).expect("Failed to add documents");
        batch
    }

    pub fn pipeline(&self) -> Pipeline {
        let config = Arc::new(PipelineConfig::from_config(&Config::default()));
        Pipeline::new(config, self.tools.tool_set())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.case_dir.join("LEXNET_READY")
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// PDF names in the output folder, sorted.
    pub fn output_pdfs(&self) -> Vec<String> {
        list_pdf_names(&self.output_dir()).expect("Failed to list output directory")
    }

    /// Runs `batch` to completion and collects the emitted events.
    pub fn run(&self, batch: &mut Batch) -> Result<RunCapture> {
        self.run_with(batch, &AtomicBool::new(false), None)
    }

    /// Like `run`, with an explicit cancel flag and an optional reporter
    /// that sees every event before it is captured.
    pub fn run_with(
        &self,
        batch: &mut Batch,
        cancel: &AtomicBool,
        observer: Option<&dyn ProgressReporter>,
    ) -> Result<RunCapture> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let channel = ChannelProgress::new(tx);
        let tee = Tee {
            channel: &channel,
            observer,
        };

        let summary = self.pipeline().run(batch, &tee, cancel)?;

        Ok(RunCapture {
            summary,
            events: rx.try_iter().collect(),
        })
    }

    pub fn read_output(&self, name: &str) -> String {
        let bytes = std::fs::read(self.output_path(name)).expect("Failed to read output file");
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn exists(&self, name: &str) -> bool {
        Path::new(&self.output_path(name)).exists()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

struct Tee<'a> {
    channel: &'a ChannelProgress,
    observer: Option<&'a dyn ProgressReporter>,
}

impl ProgressReporter for Tee<'_> {
    fn report(&self, event: RunEvent) {
        if let Some(observer) = self.observer {
            observer.report(event.clone());
        }
        self.channel.report(event);
    }
}
