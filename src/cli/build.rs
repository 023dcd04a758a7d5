//! `build` command: one-shot compile and export.
//!
//! Bypasses the debounce path entirely but uses the same compiler
//! collaborator as the live pipeline.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::compile::{Compiler, TectonicCompiler};
use crate::config::PreviewConfig;
use crate::{export, log};

pub fn run(config: &PreviewConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let compiler =
        TectonicCompiler::new(PreviewConfig::resolve_command(&config.compile.command).as_deref())?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let started = Instant::now();
    let bytes = rt.block_on(compiler.compile(&source))?;

    let out = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.with_extension("pdf"));
    export::write_pdf(&out, &bytes)?;

    log!("build"; "compiled {} -> {} ({} KiB in {:.1?})",
        file.display(), out.display(), bytes.len() / 1024, started.elapsed());
    Ok(())
}
