pub mod document;
pub mod naming;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

pub use document::{Document, DocumentOutcome, DocumentStage, SignatureDetails};

use crate::config::DEFAULT_OUTPUT_DIRECTORY_NAME;
use crate::error::BatchError;

/// Result of adding files to a batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub added: usize,
    pub duplicates: usize,
}

/// The operator's selection: documents from one folder, in the order they
/// were added, plus the batch-wide options.
#[derive(Debug, Clone)]
pub struct Batch {
    source_directory: Option<PathBuf>,
    documents: Vec<Document>,
    generate_index: bool,
    output_directory_name: String,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    pub fn new() -> Self {
        Self::with_output_directory_name(DEFAULT_OUTPUT_DIRECTORY_NAME)
    }

    pub fn with_output_directory_name(name: &str) -> Self {
        Self {
            source_directory: None,
            documents: Vec::new(),
            generate_index: true,
            output_directory_name: name.to_string(),
        }
    }

    /// Adds files, skipping ones already present. The whole call is rejected
    /// if any file lives outside the batch's folder, or if two documents
    /// would produce the same output name (`a.pdf` and `a.docx`).
    pub fn add_documents<I, P>(&mut self, paths: I) -> Result<AddReport, BatchError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut resolved = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let absolute = std::path::absolute(path).map_err(|e| BatchError::ResolvePath {
                path: path.to_path_buf(),
                source: e,
            })?;
            let parent = absolute
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or_else(|| BatchError::NoParentDirectory(absolute.clone()))?
                .to_path_buf();
            resolved.push((absolute, parent));
        }

        let mut expected = self.source_directory.clone();
        for (_, parent) in &resolved {
            match &expected {
                Some(dir) if dir != parent => {
                    return Err(BatchError::MixedDirectories {
                        expected: dir.clone(),
                        found: parent.clone(),
                    });
                }
                Some(_) => {}
                None => expected = Some(parent.clone()),
            }
        }

        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for document in &self.documents {
            for key in output_keys(document.source_path()) {
                claimed.insert(key, document.source_path().to_path_buf());
            }
        }
        let mut fresh = Vec::with_capacity(resolved.len());
        let mut report = AddReport::default();
        for (path, _) in resolved {
            if self.contains(&path) || fresh.contains(&path) {
                report.duplicates += 1;
                continue;
            }
            let keys = output_keys(&path);
            if let Some((key, existing)) = keys
                .iter()
                .find_map(|key| claimed.get(key).map(|existing| (key, existing)))
            {
                return Err(BatchError::NameCollision {
                    existing: existing.clone(),
                    rejected: path.clone(),
                    output: key.clone(),
                });
            }
            for key in keys {
                claimed.insert(key, path.clone());
            }
            fresh.push(path);
        }

        for path in fresh {
            debug!("Added document {}", naming::file_label(&path));
            self.documents.push(Document::new(path));
            report.added += 1;
        }

        if !self.documents.is_empty() {
            self.source_directory = expected;
        }

        Ok(report)
    }

    pub fn contains(&self, path: &Path) -> bool {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.documents.iter().any(|d| d.source_path() == absolute)
    }

    pub fn document(&self, path: &Path) -> Option<&Document> {
        self.documents.iter().find(|d| d.source_path() == path)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub(crate) fn documents_mut(&mut self) -> &mut [Document] {
        &mut self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn set_sign_intent(&mut self, path: &Path, sign: bool) -> Result<(), BatchError> {
        let document = self.find_mut(path)?;
        document.set_sign_intent(sign);
        Ok(())
    }

    /// Flips the sign checkbox and returns the new value.
    pub fn toggle_sign_intent(&mut self, path: &Path) -> Result<bool, BatchError> {
        let document = self.find_mut(path)?;
        let sign = !document.sign_intent();
        document.set_sign_intent(sign);
        Ok(sign)
    }

    pub fn set_sign_intent_all(&mut self, sign: bool) {
        for document in &mut self.documents {
            document.set_sign_intent(sign);
        }
    }

    pub fn generate_index(&self) -> bool {
        self.generate_index
    }

    pub fn set_generate_index(&mut self, generate: bool) {
        self.generate_index = generate;
    }

    pub fn source_directory(&self) -> Option<&Path> {
        self.source_directory.as_deref()
    }

    pub fn output_directory_name(&self) -> &str {
        &self.output_directory_name
    }

    /// `<source folder>/LEXNET_READY`, once the batch has a folder.
    pub fn output_directory(&self) -> Option<PathBuf> {
        self.source_directory
            .as_ref()
            .map(|dir| dir.join(&self.output_directory_name))
    }

    /// Drops every document; the next add picks a new folder.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.source_directory = None;
    }

    pub(crate) fn reset_for_run(&mut self) {
        for document in &mut self.documents {
            document.reset();
        }
    }

    fn find_mut(&mut self, path: &Path) -> Result<&mut Document, BatchError> {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.documents
            .iter_mut()
            .find(|d| d.source_path() == absolute)
            .ok_or(BatchError::UnknownDocument(absolute))
    }
}

/// Lowercased derived and signed names a source may produce. `A.pdf` and
/// `a.pdf` would overwrite each other on case-insensitive filesystems.
fn output_keys(source: &Path) -> [String; 2] {
    let derived = PathBuf::from(naming::derived_pdf_name(source));
    let signed = naming::signed_pdf_path(&derived);
    [
        naming::file_label(&derived).to_lowercase(),
        naming::file_label(&signed).to_lowercase(),
    ]
}
