//! File-write collaborator: source save and PDF export.
//!
//! The pipeline core persists nothing itself; a front end hands over a
//! `(path, content|bytes)` pair and this module writes it.

use std::path::Path;

use anyhow::{Context, Result};

/// Write a source buffer to disk.
pub fn write_source(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to save source to {}", path.display()))
}

/// Write compiled PDF bytes to disk.
pub fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to export PDF to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_source_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("draft.tex");
        write_source(&path, "\\section{A}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\\section{A}");
    }

    #[test]
    fn test_write_pdf_writes_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");
        write_pdf(&path, b"%PDF-1.7 fake").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7 fake");
    }

    #[test]
    fn test_write_to_missing_directory_fails_with_context() {
        let err = write_pdf(Path::new("/nonexistent-dir/out.pdf"), b"x").unwrap_err();
        assert!(err.to_string().contains("failed to export PDF"));
    }
}
