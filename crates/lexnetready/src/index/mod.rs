//! The `DOC 0` index: a linked table of contents over the output directory.

pub mod render;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::batch::naming;
use crate::error::{IndexError, StorageError};
use crate::storage::list_pdf_names;

pub const INDEX_FILE_NAME: &str = "DOC 0 - Indice.pdf";

/// Files whose lowercased name starts with this are never listed, which keeps
/// the index (signed or not) out of itself.
pub const INDEX_RESERVED_PREFIX: &str = "doc 0";

pub const INDEX_TITLE: &str = "Document Index";

/// Attribution line printed in light grey under the entries.
pub const DEFAULT_INDEX_FOOTER: &str =
    "Índice generado por LexnetReady - MIT-TAL license. 2025, José Carlos Rueda (jcrueda.com).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Link target, relative to the index itself.
    pub file_name: String,
    /// Uppercased name without extension.
    pub display_name: String,
}

impl IndexEntry {
    pub fn new(file_name: &str) -> Self {
        let display_name = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_default();
        Self {
            file_name: file_name.to_string(),
            display_name,
        }
    }
}

pub fn is_reserved_name(name: &str) -> bool {
    name.to_lowercase().starts_with(INDEX_RESERVED_PREFIX)
}

/// Entries for every listable PDF in `directory`, ordered by lowercased name.
pub fn collect_entries(directory: &Path) -> Result<Vec<IndexEntry>, StorageError> {
    let mut names: Vec<String> = list_pdf_names(directory)?
        .into_iter()
        .filter(|name| !is_reserved_name(name))
        .collect();
    names.sort_by_key(|name| name.to_lowercase());

    Ok(names.iter().map(|name| IndexEntry::new(name)).collect())
}

/// Writes the unsigned index into `directory` and returns its path.
pub fn write_index(directory: &Path, footer: &str) -> Result<PathBuf, IndexError> {
    let _span = tracing::info_span!("index.write").entered();

    let entries = collect_entries(directory)?;
    let bytes = render::render_index(INDEX_TITLE, &entries, footer)?;

    let path = directory.join(INDEX_FILE_NAME);
    std::fs::write(&path, bytes).map_err(|e| StorageError::WriteFile {
        path: path.clone(),
        source: e,
    })?;

    info!(
        entries = entries.len(),
        file = %naming::file_label(&path),
        "index written"
    );
    Ok(path)
}
