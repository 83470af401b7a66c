use std::io::Write;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::batch::naming;
use crate::error::StorageError;

/// Marks an output directory as owned by a running pipeline.
pub const LOCK_FILE_NAME: &str = ".lexnetready.lock";

pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

/// File names of the PDFs directly inside `directory` (no recursion).
pub fn list_pdf_names(directory: &Path) -> Result<Vec<String>, StorageError> {
    let mut names = Vec::new();

    for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| StorageError::ReadDirectory {
            path: directory.to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if naming::is_pdf_name(&name) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Removes `path`, treating an already missing file as done. Returns whether
/// something was deleted.
pub fn remove_if_exists(path: &Path) -> Result<bool, StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::RemoveFile {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Exclusive claim on an output directory for the lifetime of a run.
///
/// The lock file is created with `create_new` and holds the owner's PID, so
/// two runs (even from separate processes) cannot both hold it. A lock whose
/// owner is no longer running is taken over. Dropping the guard releases it.
#[derive(Debug)]
pub struct OutputLock {
    path: PathBuf,
}

impl OutputLock {
    pub fn acquire(directory: &Path) -> Result<Self, StorageError> {
        let path = directory.join(LOCK_FILE_NAME);

        match Self::create(&path) {
            Err(StorageError::Locked(_)) if is_stale(&path) => {
                log::warn!(
                    "Taking over lock {} left by a process that is gone",
                    path.display()
                );
                remove_if_exists(&path)?;
                // A concurrent takeover may still win the race here.
                Self::create(&path)
            }
            other => other,
        }
    }

    fn create(path: &Path) -> Result<Self, StorageError> {
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(mut file) => {
                let pid = std::process::id();
                file.write_all(pid.to_string().as_bytes())
                    .map_err(|e| StorageError::WriteFile {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                Ok(Self {
                    path: path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StorageError::Locked(path.to_path_buf()))
            }
            Err(e) => Err(StorageError::WriteFile {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True when the lock names a PID that no running process has. Unreadable
/// or empty lock files are treated as held.
fn is_stale(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(pid) = content.trim().parse::<u32>() else {
        return false;
    };
    if pid == std::process::id() {
        return false;
    }

    let system = sysinfo::System::new_all();
    system.process(sysinfo::Pid::from_u32(pid)).is_none()
}

impl Drop for OutputLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}
