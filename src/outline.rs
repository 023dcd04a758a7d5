//! Document structure extraction.
//!
//! Scans LaTeX source for sectioning commands and produces a flat outline
//! with nesting levels and 1-based line numbers. Recomputed on every
//! committed content change; a pure text scan, fully independent of the
//! compile pipeline.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// One sectioning entry in the document structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub title: String,
    /// 1 = `\section`, 2 = `\subsection`, 3 = `\subsubsection`
    pub level: u8,
    /// 1-based source line
    pub line: usize,
}

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(section|subsection|subsubsection)\*?\s*\{([^}]*)\}").unwrap()
});

/// Extract the outline from LaTeX source.
///
/// Starred variants count as their unstarred level. Anything after an
/// unescaped `%` is ignored.
pub fn extract(source: &str) -> Vec<OutlineItem> {
    let mut items = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let scan = strip_comment(line);
        for caps in HEADING.captures_iter(scan) {
            let level = match &caps[1] {
                "section" => 1,
                "subsection" => 2,
                _ => 3,
            };
            items.push(OutlineItem {
                title: caps[2].trim().to_string(),
                level,
                line: idx + 1,
            });
        }
    }

    items
}

/// Cut a line at the first unescaped `%`.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'%' && (i == 0 || bytes[i - 1] != b'\\') {
            return &line[..i];
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_levels_and_lines() {
        let source = "\\documentclass{article}\n\
                      \\begin{document}\n\
                      \\section{Intro}\n\
                      \\subsection{Background}\n\
                      \\subsubsection{Details}\n\
                      \\end{document}\n";

        let items = extract(source);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], OutlineItem { title: "Intro".into(), level: 1, line: 3 });
        assert_eq!(items[1], OutlineItem { title: "Background".into(), level: 2, line: 4 });
        assert_eq!(items[2], OutlineItem { title: "Details".into(), level: 3, line: 5 });
    }

    #[test]
    fn test_extract_starred_variant() {
        let items = extract("\\section*{Unnumbered}");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Unnumbered");
        assert_eq!(items[0].level, 1);
    }

    #[test]
    fn test_extract_skips_comments() {
        let source = "% \\section{Commented out}\n\
                      \\section{Real} % trailing \\section{Also commented}\n";

        let items = extract(source);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Real");
        assert_eq!(items[0].line, 2);
    }

    #[test]
    fn test_extract_escaped_percent_is_not_a_comment() {
        let items = extract("\\section{50\\% done}");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "50\\% done");
    }

    #[test]
    fn test_extract_no_sections() {
        assert!(extract("plain text without headings").is_empty());
    }

    #[test]
    fn test_extract_trims_titles() {
        let items = extract("\\section{  padded  }");
        assert_eq!(items[0].title, "padded");
    }
}
