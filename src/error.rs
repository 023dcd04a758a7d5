//! Pipeline error taxonomy.
//!
//! Nothing here is fatal to the process: a compile or decode failure is an
//! expected outcome of editing, surfaced as display state and cleared by the
//! next successful result. Nothing is retried automatically — each new edit
//! (or manual recompile) is itself the retry.

use thiserror::Error;

/// Errors produced by the compiler collaborator.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    /// The compiler ran and rejected the source. The message is the
    /// compiler's own diagnostics, verbatim.
    #[error("{0}")]
    Compiler(String),

    /// The compiler could not be reached or executed. Displayed exactly like
    /// a compiler failure; only the message text differs.
    #[error("compiler unavailable: {0}")]
    Transport(String),

    /// Blank source snapshot.
    #[error("latex content is empty - add some code and try again")]
    EmptySource,
}

/// Errors produced by the decoder collaborator. Surfaced as renderer status;
/// the compile scheduler never sees these.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The decoder is not installed or not executable.
    #[error("decoder unavailable: {0}")]
    Unavailable(String),

    /// The artifact could not be opened as a document.
    #[error("failed to open document: {0}")]
    Open(String),

    /// A page could not be located in an open document.
    #[error("failed to load page {index}: {message}")]
    Page { index: usize, message: String },

    /// A page failed to draw onto its surface.
    #[error("failed to draw page {index}: {message}")]
    Draw { index: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_display() {
        let err = CompileError::Compiler("! Undefined control sequence.".into());
        assert_eq!(err.to_string(), "! Undefined control sequence.");

        let err = CompileError::Transport("tectonic not found".into());
        assert!(err.to_string().contains("compiler unavailable"));
    }

    #[test]
    fn test_decode_error_carries_page_index() {
        let err = DecodeError::Draw {
            index: 3,
            message: "pdftoppm exited with status 1".into(),
        };
        assert!(err.to_string().contains("page 3"));
    }
}
