//! Document Workspace
//!
//! In-memory source documents and the active edit buffer. Edits are buffered
//! against the active document and flushed into its stored content only when
//! the active selection changes, so every keystroke does not copy the
//! document record.
//!
//! Invariant: once the workspace is non-empty, `active` always resolves to
//! an existing document.

/// A named in-memory LaTeX source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub content: String,
}

/// Name given to the document a fresh workspace starts with.
pub const DEFAULT_DOCUMENT: &str = "main.tex";

/// The set of open documents, in insertion order, plus the live edit buffer
/// for the active one.
#[derive(Debug)]
pub struct Workspace {
    documents: Vec<SourceDocument>,
    active: String,
    buffer: String,
}

impl Workspace {
    /// Workspace with a single starter document.
    pub fn new() -> Self {
        Self::with_document(DEFAULT_DOCUMENT, starter_template())
    }

    /// Workspace seeded with one named document (e.g. a file read from disk).
    pub fn with_document(name: &str, content: impl Into<String>) -> Self {
        let name = normalize_name(name).unwrap_or_else(|| DEFAULT_DOCUMENT.to_string());
        let content = content.into();
        Self {
            documents: vec![SourceDocument {
                name: name.clone(),
                content: content.clone(),
            }],
            active: name,
            buffer: content,
        }
    }

    /// Add a document and make it active.
    ///
    /// The name is normalized to a `.tex` extension. If a document with that
    /// name already exists this is a no-op (no selection change, no buffer
    /// change). Pending edits of the outgoing document are persisted first.
    ///
    /// Returns the canonical name and whether a document was created; `None`
    /// if the name is blank.
    pub fn add_document(&mut self, name: &str) -> Option<(String, bool)> {
        let canonical = normalize_name(name)?;
        if self.documents.iter().any(|d| d.name == canonical) {
            return Some((canonical, false));
        }

        self.persist_active();
        let content = file_template(&canonical);
        self.documents.push(SourceDocument {
            name: canonical.clone(),
            content: content.clone(),
        });
        self.active = canonical.clone();
        self.buffer = content;
        Some((canonical, true))
    }

    /// Switch the active document.
    ///
    /// No-ops if `name` is already active, and fails silently (no state
    /// change) if `name` does not exist. Pending edits of the outgoing
    /// document are persisted before the target's stored content becomes the
    /// new edit buffer. Returns whether a switch happened.
    pub fn select_document(&mut self, name: &str) -> bool {
        if name == self.active {
            return false;
        }
        let Some(pos) = self.documents.iter().position(|d| d.name == name) else {
            return false;
        };

        self.persist_active();
        self.active = self.documents[pos].name.clone();
        self.buffer = self.documents[pos].content.clone();
        true
    }

    /// Replace the edit buffer for the active document.
    ///
    /// Does not write through to the stored document record; that happens
    /// only on the next selection change.
    pub fn update_active_content(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Name of the active document.
    pub fn active_name(&self) -> &str {
        &self.active
    }

    /// The live edit buffer (what a compile snapshot is taken from).
    pub fn active_content(&self) -> &str {
        &self.buffer
    }

    /// Stored record of a document (pending edits of the active document are
    /// not reflected here until the selection changes).
    pub fn document(&self, name: &str) -> Option<&SourceDocument> {
        self.documents.iter().find(|d| d.name == name)
    }

    /// Document names in insertion order.
    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Flush the edit buffer into the active document's stored content.
    fn persist_active(&mut self) {
        let active = &self.active;
        if let Some(doc) = self.documents.iter_mut().find(|d| &d.name == active) {
            doc.content = self.buffer.clone();
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonicalize a document name: trimmed, `.tex` extension appended when
/// missing. Blank names are rejected.
pub fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    if name.ends_with(".tex") {
        Some(name.to_string())
    } else {
        Some(format!("{name}.tex"))
    }
}

/// Body every newly added document starts with.
fn file_template(name: &str) -> String {
    format!(
        "% New file: {name}\n\
         \\documentclass{{article}}\n\
         \\begin{{document}}\n\
         New file: {name}\n\
         \\end{{document}}\n"
    )
}

/// Body of the starter document in a fresh workspace.
fn starter_template() -> String {
    "\\documentclass{article}\n\
     \\usepackage[utf8]{inputenc}\n\
     \\usepackage{amsmath}\n\
     \n\
     \\title{Untitled Document}\n\
     \\author{}\n\
     \\date{\\today}\n\
     \n\
     \\begin{document}\n\
     \n\
     \\maketitle\n\
     \n\
     \\section{Introduction}\n\
     \n\
     Start writing here.\n\
     \n\
     \\end{document}\n"
        .to_string()
}
