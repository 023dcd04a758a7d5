//! `outline` command: dump the document structure as JSON.

use std::path::Path;

use anyhow::{Context, Result};

use crate::outline;

pub fn run(file: &Path, pretty: bool) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let items = outline::extract(&source);
    let json = if pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };
    println!("{json}");
    Ok(())
}
