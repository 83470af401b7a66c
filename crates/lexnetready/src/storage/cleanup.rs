//! Removes unsigned PDFs that have a signed counterpart.
//!
//! A document that was signed leaves `x.pdf` and `x_firmado.pdf` behind; only
//! the signed one is kept. Files are matched purely by base identity (see
//! [`naming::base_identity`]), so unsigned PDFs of documents that were never
//! signed, or whose signing failed, stay where they are.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::batch::naming;
use crate::error::StorageError;
use crate::storage::output::{list_pdf_names, remove_if_exists};

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Unsigned PDFs deleted in this pass.
    pub removed: Vec<String>,
    /// Unsigned PDFs that should have gone but could not be deleted.
    pub failed: Vec<StorageError>,
}

/// One reconciliation pass over `output_directory`.
///
/// Only listing the directory can fail the pass; individual deletion errors
/// are collected in the report and the file is left in place.
pub fn reconcile_signed(output_directory: &Path) -> Result<CleanupReport, StorageError> {
    reconcile_with(output_directory, remove_if_exists)
}

fn reconcile_with<F>(
    output_directory: &Path,
    mut remove: F,
) -> Result<CleanupReport, StorageError>
where
    F: FnMut(&Path) -> Result<bool, StorageError>,
{
    let _span = tracing::info_span!("storage.cleanup").entered();

    let names = list_pdf_names(output_directory)?;

    let signed_identities: HashSet<String> = names
        .iter()
        .filter(|name| naming::is_signed_name(name))
        .map(|name| naming::base_identity(name))
        .collect();

    let mut report = CleanupReport::default();
    if signed_identities.is_empty() {
        return Ok(report);
    }

    for name in names.iter().filter(|name| !naming::is_signed_name(name)) {
        if !signed_identities.contains(&naming::base_identity(name)) {
            continue;
        }

        match remove(&output_directory.join(name)) {
            Ok(true) => {
                debug!(file = %name, "removed unsigned original");
                report.removed.push(name.clone());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(file = %name, error = %e, "could not remove unsigned original");
                report.failed.push(e);
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"%PDF-1.7").unwrap();
        }
    }

    #[test]
    fn test_removes_only_unsigned_with_signed_variant() {
        let dir = TempDir::new().unwrap();
        touch(
            dir.path(),
            &["a.pdf", "a_firmado.pdf", "b.pdf", "b_firmado.pdf", "c.pdf"],
        );

        let report = reconcile_signed(dir.path()).unwrap();

        assert_eq!(report.removed, vec!["a.pdf", "b.pdf"]);
        assert!(report.failed.is_empty());
        assert_eq!(
            list_pdf_names(dir.path()).unwrap(),
            vec!["a_firmado.pdf", "b_firmado.pdf", "c.pdf"]
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["Demanda.PDF", "demanda_FIRMADO.pdf"]);

        let report = reconcile_signed(dir.path()).unwrap();
        assert_eq!(report.removed, vec!["Demanda.PDF"]);
    }

    #[test]
    fn test_signed_files_are_never_removed() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a_firmado.pdf", "a_firmado_firmado.pdf"]);

        let report = reconcile_signed(dir.path()).unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(list_pdf_names(dir.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_similar_names_are_not_confused() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["acta.pdf", "acta 2.pdf", "acta 2_firmado.pdf"]);

        let report = reconcile_signed(dir.path()).unwrap();
        assert_eq!(report.removed, vec!["acta 2.pdf"]);
        assert!(dir.path().join("acta.pdf").exists());
    }

    #[test]
    fn test_second_pass_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.pdf", "a_firmado.pdf", "c.pdf"]);

        reconcile_signed(dir.path()).unwrap();
        let after_first = list_pdf_names(dir.path()).unwrap();

        let second = reconcile_signed(dir.path()).unwrap();
        assert!(second.removed.is_empty());
        assert!(second.failed.is_empty());
        assert_eq!(list_pdf_names(dir.path()).unwrap(), after_first);
    }

    #[test]
    fn test_non_pdf_files_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a_firmado.pdf", "a.txt"]);

        let report = reconcile_signed(dir.path()).unwrap();
        assert!(report.removed.is_empty());
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_deletion_failure_is_reported_and_file_kept() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.pdf", "a_firmado.pdf", "b.pdf", "b_firmado.pdf"]);

        let report = reconcile_with(dir.path(), |path| {
            if path.ends_with("a.pdf") {
                Err(StorageError::RemoveFile {
                    path: path.to_path_buf(),
                    source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                })
            } else {
                remove_if_exists(path)
            }
        })
        .unwrap();

        assert_eq!(report.removed, vec!["b.pdf"]);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            &report.failed[0],
            StorageError::RemoveFile { path, .. } if path.ends_with("a.pdf")
        ));
        assert!(dir.path().join("a.pdf").exists());
        assert!(!dir.path().join("b.pdf").exists());
    }
}
