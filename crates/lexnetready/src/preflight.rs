//! Checks that every external tool a run needs is actually installed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::ToolsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependency {
    Ocr,
    Converter,
    JavaRuntime,
    SignerJar,
    Inspector,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Ocr => write!(f, "OCR tool"),
            Dependency::Converter => write!(f, "document converter"),
            Dependency::JavaRuntime => write!(f, "Java runtime"),
            Dependency::SignerJar => write!(f, "AutoFirma"),
            Dependency::Inspector => write!(f, "signature inspector"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub dependency: Dependency,
    /// What was looked for: a program name or a path.
    pub location: String,
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.dependency, self.location)
    }
}

#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Missing dependencies: {}", format_missing(.0))]
    DependencyMissing(Vec<MissingDependency>),
}

impl PreflightError {
    pub fn missing(&self) -> &[MissingDependency] {
        match self {
            PreflightError::DependencyMissing(missing) => missing,
        }
    }
}

fn format_missing(missing: &[MissingDependency]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every configured tool, resolved. All problems are reported together.
pub fn check_dependencies(tools: &ToolsConfig) -> Result<(), PreflightError> {
    let _span = tracing::info_span!("preflight").entered();

    let checks = [
        (Dependency::Ocr, tools.ocr.program.as_str(), Requirement::Program),
        (Dependency::Converter, tools.converter.program.as_str(), Requirement::Program),
        (Dependency::JavaRuntime, tools.signer.java.as_str(), Requirement::Program),
        (Dependency::SignerJar, tools.signer.jar.as_str(), Requirement::File),
        (Dependency::Inspector, tools.inspector.program.as_str(), Requirement::Program),
    ];

    let missing: Vec<MissingDependency> = checks
        .into_iter()
        .filter(|(_, location, requirement)| !requirement.is_met(location))
        .map(|(dependency, location, _)| {
            tracing::warn!(%dependency, location, "dependency not found");
            MissingDependency {
                dependency,
                location: location.to_string(),
            }
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PreflightError::DependencyMissing(missing))
    }
}

/// Resolves a program the way the OS would when spawning it.
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[derive(Clone, Copy)]
enum Requirement {
    /// A bare name is looked up on `PATH`; a path must exist.
    Program,
    File,
}

impl Requirement {
    fn is_met(self, location: &str) -> bool {
        match self {
            Requirement::Program => resolve_program(location).is_some(),
            Requirement::File => Path::new(location).is_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tools_with(dir: &Path, jar_exists: bool) -> ToolsConfig {
        let jar = dir.join("autofirma.jar");
        if jar_exists {
            std::fs::write(&jar, b"PK").unwrap();
        }
        let mut tools = ToolsConfig::default();
        tools.signer.jar = jar.display().to_string();
        tools
    }

    #[cfg(unix)]
    #[test]
    fn test_all_present() {
        let dir = TempDir::new().unwrap();
        let mut tools = tools_with(dir.path(), true);
        tools.ocr.program = "sh".to_string();
        tools.converter.program = "sh".to_string();
        tools.signer.java = "sh".to_string();
        tools.inspector.program = "sh".to_string();

        assert!(check_dependencies(&tools).is_ok());
    }

    #[test]
    fn test_reports_every_missing_dependency() {
        let dir = TempDir::new().unwrap();
        let mut tools = tools_with(dir.path(), false);
        tools.ocr.program = "lexnetready-missing-ocr".to_string();
        tools.converter.program = "lexnetready-missing-office".to_string();
        tools.signer.java = "lexnetready-missing-java".to_string();
        tools.inspector.program = "lexnetready-missing-pdfsig".to_string();

        let err = check_dependencies(&tools).unwrap_err();
        let kinds: Vec<Dependency> = err.missing().iter().map(|m| m.dependency).collect();
        assert_eq!(
            kinds,
            vec![
                Dependency::Ocr,
                Dependency::Converter,
                Dependency::JavaRuntime,
                Dependency::SignerJar,
                Dependency::Inspector,
            ]
        );
        assert!(err.to_string().contains("lexnetready-missing-java"));
    }

    #[test]
    fn test_explicit_program_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("soffice");
        assert!(resolve_program(&missing.display().to_string()).is_none());
    }
}
