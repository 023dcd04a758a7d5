//! Tectonic-backed compiler.
//!
//! Runs the self-contained `tectonic` engine as an external process in a
//! scratch directory and returns the produced PDF bytes. Compiler
//! diagnostics are surfaced verbatim.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::process::Command;

use super::Compiler;
use crate::error::CompileError;

pub struct TectonicCompiler {
    program: PathBuf,
    /// Session-scoped parent for per-call scratch directories; removed on drop.
    workdir: TempDir,
}

impl TectonicCompiler {
    /// Locate `tectonic` on PATH, or use the given override.
    pub fn new(command: Option<&Path>) -> Result<Self, CompileError> {
        let program = match command {
            Some(path) => path.to_path_buf(),
            None => which::which("tectonic")
                .map_err(|e| CompileError::Transport(format!("tectonic not found: {e}")))?,
        };
        let workdir = TempDir::new()
            .map_err(|e| CompileError::Transport(format!("failed to create workdir: {e}")))?;
        Ok(Self { program, workdir })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Compiler for TectonicCompiler {
    async fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        if source.trim().is_empty() {
            return Err(CompileError::EmptySource);
        }

        // Concurrent calls are possible (manual trigger while one is in
        // flight), so each gets its own scratch directory.
        let scratch = TempDir::new_in(self.workdir.path())
            .map_err(|e| CompileError::Transport(format!("failed to create scratch dir: {e}")))?;
        let tex_path = scratch.path().join("main.tex");
        std::fs::write(&tex_path, source)
            .map_err(|e| CompileError::Transport(format!("failed to stage source: {e}")))?;

        let output = Command::new(&self.program)
            .args(["-X", "compile", "main.tex"])
            .current_dir(scratch.path())
            .output()
            .await
            .map_err(|e| {
                CompileError::Transport(format!(
                    "failed to run {}: {e}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompileError::Compiler(
                format!("{stdout}\n{stderr}").trim().to_string(),
            ));
        }

        let pdf_path = scratch.path().join("main.pdf");
        let bytes = std::fs::read(&pdf_path)
            .map_err(|e| CompileError::Compiler(format!("no PDF produced: {e}")))?;

        if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
            let prefix = String::from_utf8_lossy(&bytes[..bytes.len().min(50)]).into_owned();
            return Err(CompileError::Compiler(format!(
                "output is not a valid PDF (starts with: {prefix})"
            )));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_source_rejected_before_spawn() {
        // A bogus program path: the empty check must fire first.
        let compiler = TectonicCompiler::new(Some(Path::new("/nonexistent/tectonic"))).unwrap();
        let err = compiler.compile("   \n\t  ").await.unwrap_err();
        assert!(matches!(err, CompileError::EmptySource));
    }

    #[tokio::test]
    async fn test_unreachable_compiler_is_transport_error() {
        let compiler = TectonicCompiler::new(Some(Path::new("/nonexistent/tectonic"))).unwrap();
        let err = compiler
            .compile("\\documentclass{article}\\begin{document}x\\end{document}")
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Transport(_)));
    }
}
