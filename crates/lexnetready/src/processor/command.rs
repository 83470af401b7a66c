use std::path::Path;
use std::process::{Command, Output};

use tracing::debug;

use crate::error::ToolError;

/// Longest stderr excerpt kept in an error message.
const MAX_STDERR_CHARS: usize = 600;

/// Runs `cmd` to completion and maps spawn failures and non-zero exits to
/// [`ToolError`]. Captured stdout is returned on success.
pub(crate) fn run_tool(mut cmd: Command, program: &str) -> Result<Output, ToolError> {
    debug!(program = %program_label(program), "invoking external tool");

    let output = cmd.output().map_err(|e| ToolError::Spawn {
        program: program.to_string(),
        source: e,
    })?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(ToolError::ExitStatus {
            program: program.to_string(),
            exit_code: output.status.code(),
            stderr: stderr_excerpt(&output),
        })
    }
}

/// Fails with `MissingOutput` when a tool exited cleanly without writing
/// the file it was asked for.
pub(crate) fn require_output(program: &str, path: &Path) -> Result<(), ToolError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ToolError::MissingOutput {
            program: program.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Deletes whatever a failed tool left behind at `path`.
pub(crate) fn discard_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(file = %crate::batch::naming::file_label(path), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            "Could not remove partial output {}: {}",
            crate::batch::naming::file_label(path),
            e
        ),
    }
}

fn stderr_excerpt(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    let text = if trimmed.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        trimmed.to_string()
    };

    let count = text.chars().count();
    if count <= MAX_STDERR_CHARS {
        text
    } else {
        let tail: String = text.chars().skip(count - MAX_STDERR_CHARS).collect();
        format!("...{}", tail)
    }
}

fn program_label(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}
