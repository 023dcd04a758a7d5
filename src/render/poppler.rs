//! Poppler-backed decoder.
//!
//! Drives the `pdfinfo` and `pdftoppm` utilities as external processes:
//! `open` stages the artifact in a scratch file and reads the page
//! inventory, `draw` rasterizes one page to PNG and decodes it into the
//! surface.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokio::process::Command;

use super::{Decoder, PageHandle, PageSize, Surface};
use crate::error::DecodeError;

pub struct PopplerDecoder {
    pdfinfo: PathBuf,
    pdftoppm: PathBuf,
    scale: f32,
}

/// An opened artifact: staged bytes plus the page inventory.
pub struct PopplerDocument {
    /// Owns the staged `artifact.pdf` and per-page scratch output.
    dir: TempDir,
    path: PathBuf,
    pages: Vec<PageSize>,
}

impl PopplerDecoder {
    /// Locate the poppler utilities on PATH, or use the given overrides.
    pub fn new(
        pdfinfo: Option<&Path>,
        pdftoppm: Option<&Path>,
        scale: f32,
    ) -> Result<Self, DecodeError> {
        let pdfinfo = resolve_tool("pdfinfo", pdfinfo)?;
        let pdftoppm = resolve_tool("pdftoppm", pdftoppm)?;
        Ok(Self {
            pdfinfo,
            pdftoppm,
            scale,
        })
    }

    /// Rasterization resolution for the configured display scale.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn dpi(&self) -> u32 {
        (72.0 * self.scale).round().max(1.0) as u32
    }
}

fn resolve_tool(name: &str, override_path: Option<&Path>) -> Result<PathBuf, DecodeError> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => which::which(name)
            .map_err(|e| DecodeError::Unavailable(format!("{name} not found: {e}"))),
    }
}

impl Decoder for PopplerDecoder {
    type Document = PopplerDocument;

    async fn open(&self, bytes: &[u8]) -> Result<PopplerDocument, DecodeError> {
        let dir = TempDir::new()
            .map_err(|e| DecodeError::Open(format!("failed to create scratch dir: {e}")))?;
        let path = dir.path().join("artifact.pdf");
        std::fs::write(&path, bytes)
            .map_err(|e| DecodeError::Open(format!("failed to stage artifact: {e}")))?;

        let output = Command::new(&self.pdfinfo)
            .args(["-f", "1", "-l", "100000"])
            .arg(&path)
            .output()
            .await
            .map_err(|e| DecodeError::Open(format!("failed to run pdfinfo: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecodeError::Open(stderr.trim().to_string()));
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        let pages = parse_inventory(&raw).map_err(DecodeError::Open)?;

        Ok(PopplerDocument { dir, path, pages })
    }

    fn page_count(&self, document: &PopplerDocument) -> usize {
        document.pages.len()
    }

    async fn page(
        &self,
        document: &PopplerDocument,
        index: usize,
    ) -> Result<PageHandle, DecodeError> {
        document
            .pages
            .get(index.wrapping_sub(1))
            .map(|&size| PageHandle { index, size })
            .ok_or_else(|| DecodeError::Page {
                index,
                message: format!("page out of range (document has {})", document.pages.len()),
            })
    }

    async fn draw(
        &self,
        document: &PopplerDocument,
        page: &PageHandle,
        surface: &mut Surface,
    ) -> Result<(), DecodeError> {
        let draw_err = |message: String| DecodeError::Draw {
            index: page.index,
            message,
        };

        let prefix = document.dir.path().join(format!("page-{}", page.index));
        let output = Command::new(&self.pdftoppm)
            .arg("-png")
            .args(["-r", &self.dpi().to_string()])
            .args(["-f", &page.index.to_string()])
            .args(["-l", &page.index.to_string()])
            .arg("-singlefile")
            .arg(&document.path)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| draw_err(format!("failed to run pdftoppm: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(draw_err(stderr.trim().to_string()));
        }

        let png_path = prefix.with_extension("png");
        let png = std::fs::read(&png_path)
            .map_err(|e| draw_err(format!("no page image produced: {e}")))?;
        std::fs::remove_file(&png_path).ok();

        let image = image::load_from_memory(&png)
            .map_err(|e| draw_err(format!("failed to decode page image: {e}")))?
            .into_rgba8();

        let (width, height) = image.dimensions();
        surface.blit(width, height, image.into_raw());
        Ok(())
    }
}

/// Parse `pdfinfo -f 1 -l N` output into per-page sizes.
///
/// Pages missing an explicit size line inherit the first reported size
/// (US letter when none is reported at all).
fn parse_inventory(raw: &str) -> Result<Vec<PageSize>, String> {
    let mut count: Option<usize> = None;
    let mut sizes: Vec<(usize, PageSize)> = Vec::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("Pages:") {
            count = rest.trim().parse().ok();
        } else if line.starts_with("Page") && line.contains("size:") {
            // "Page    2 size: 612 x 792 pts (letter)"
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() >= 6
                && tokens[2] == "size:"
                && let (Ok(index), Ok(width), Ok(height)) = (
                    tokens[1].parse::<usize>(),
                    tokens[3].parse::<f32>(),
                    tokens[5].parse::<f32>(),
                )
            {
                sizes.push((index, PageSize { width, height }));
            }
        }
    }

    let count = count.ok_or_else(|| "page count missing from inventory".to_string())?;
    if count == 0 {
        return Err("document has no pages".to_string());
    }

    let default = sizes
        .first()
        .map(|&(_, size)| size)
        .unwrap_or(PageSize { width: 612.0, height: 792.0 });
    let mut pages = vec![default; count];
    for (index, size) in sizes {
        if (1..=count).contains(&index) {
            pages[index - 1] = size;
        }
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Title:          Untitled Document\n\
                          Pages:          3\n\
                          Encrypted:      no\n\
                          Page    1 size: 612 x 792 pts (letter)\n\
                          Page    1 rot:  0\n\
                          Page    2 size: 612 x 792 pts (letter)\n\
                          Page    2 rot:  0\n\
                          Page    3 size: 595.276 x 841.89 pts (A4)\n\
                          Page    3 rot:  0\n\
                          File size:      10240 bytes\n";

    #[test]
    fn test_parse_inventory_counts_and_sizes() {
        let pages = parse_inventory(SAMPLE).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], PageSize { width: 612.0, height: 792.0 });
        assert_eq!(pages[2], PageSize { width: 595.276, height: 841.89 });
    }

    #[test]
    fn test_parse_inventory_fills_missing_sizes() {
        let raw = "Pages:          2\nPage    1 size: 100 x 200 pts\n";
        let pages = parse_inventory(raw).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], PageSize { width: 100.0, height: 200.0 });
    }

    #[test]
    fn test_parse_inventory_without_count_fails() {
        assert!(parse_inventory("Title: x\n").is_err());
    }

    #[test]
    fn test_parse_inventory_zero_pages_fails() {
        assert!(parse_inventory("Pages: 0\n").is_err());
    }

    #[test]
    fn test_page_out_of_range() {
        let decoder = PopplerDecoder {
            pdfinfo: PathBuf::from("pdfinfo"),
            pdftoppm: PathBuf::from("pdftoppm"),
            scale: 1.5,
        };
        let document = PopplerDocument {
            dir: TempDir::new().unwrap(),
            path: PathBuf::from("unused.pdf"),
            pages: vec![PageSize { width: 612.0, height: 792.0 }],
        };

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let err = rt.block_on(decoder.page(&document, 2)).unwrap_err();
        assert!(matches!(err, DecodeError::Page { index: 2, .. }));
        assert!(rt.block_on(decoder.page(&document, 1)).is_ok());
        assert!(rt.block_on(decoder.page(&document, 0)).is_err());
    }

    #[test]
    fn test_dpi_follows_scale() {
        let decoder = PopplerDecoder {
            pdfinfo: PathBuf::from("pdfinfo"),
            pdftoppm: PathBuf::from("pdftoppm"),
            scale: 1.5,
        };
        assert_eq!(decoder.dpi(), 108);
    }
}
