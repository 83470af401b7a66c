//! Filename contract linking a source document to its artifacts.
//!
//! `report.docx` becomes `report.pdf` (the archival PDF) and, once signed,
//! `report_firmado.pdf`. Cleanup and indexing find related files through
//! these names only, so every stage derives them here.

use std::path::{Path, PathBuf};

pub const PDF_EXTENSION: &str = "pdf";

/// Appended to the base name of a signed artifact, replacing `.pdf`.
pub const SIGNED_SUFFIX: &str = "_firmado.pdf";

const SIGNED_MARKER: &str = "_firmado";

/// File name for span fields and log lines; never the full path.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<unknown>".to_string())
}

pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(PDF_EXTENSION))
        .unwrap_or(false)
}

pub fn is_pdf_name(name: &str) -> bool {
    has_pdf_extension(Path::new(name))
}

/// `<stem>.pdf` for any source name.
pub fn derived_pdf_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}.{}", stem, PDF_EXTENSION)
}

pub fn derived_pdf_path(source: &Path, output_directory: &Path) -> PathBuf {
    output_directory.join(derived_pdf_name(source))
}

/// `<stem>_firmado.pdf` next to the unsigned PDF.
pub fn signed_pdf_path(unsigned: &Path) -> PathBuf {
    let stem = unsigned
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{}{}.{}", stem, SIGNED_MARKER, PDF_EXTENSION);
    match unsigned.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub fn is_signed_name(name: &str) -> bool {
    strip_signed_suffix(name).is_some()
}

/// Removes exactly the trailing `_firmado.pdf` (matched case-insensitively).
pub fn strip_signed_suffix(name: &str) -> Option<&str> {
    debug_assert_eq!(
        SIGNED_SUFFIX.len(),
        SIGNED_MARKER.len() + 1 + PDF_EXTENSION.len(),
        "signed suffix must be the marker plus the pdf extension"
    );
    let cut = name.len().checked_sub(SIGNED_SUFFIX.len())?;
    if !name.is_char_boundary(cut) {
        return None;
    }
    let (base, suffix) = name.split_at(cut);
    if suffix.eq_ignore_ascii_case(SIGNED_SUFFIX) {
        Some(base)
    } else {
        None
    }
}

/// Lowercased name with the signed suffix (signed files) or the extension
/// (everything else) removed. `a_firmado.pdf` and `A.pdf` share `a`.
pub fn base_identity(name: &str) -> String {
    if let Some(base) = strip_signed_suffix(name) {
        return base.to_lowercase();
    }
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
