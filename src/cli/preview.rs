//! `preview` command: the live watch-compile-render loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;

use crate::actor::Coordinator;
use crate::compile::TectonicCompiler;
use crate::config::PreviewConfig;
use crate::render::PopplerDecoder;
use crate::workspace::Workspace;
use crate::{debug, log};

/// Start a preview session for one source file.
pub fn run(
    mut config: PreviewConfig,
    file: &Path,
    debounce_ms: Option<u64>,
    no_initial: bool,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    if let Some(ms) = debounce_ms {
        config.compile.debounce_ms = ms;
    }
    if no_initial {
        config.compile.initial = false;
    }
    config.validate()?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main.tex".to_string());
    let workspace = Workspace::with_document(&name, content);

    let compiler =
        TectonicCompiler::new(PreviewConfig::resolve_command(&config.compile.command).as_deref())?;
    let decoder = PopplerDecoder::new(
        PreviewConfig::resolve_command(&config.render.pdfinfo).as_deref(),
        PreviewConfig::resolve_command(&config.render.pdftoppm).as_deref(),
        config.render.scale,
    )?;

    log!("preview"; "watching {} (debounce {} ms)", file.display(), config.compile.debounce_ms);
    debug!("preview"; "compiler: {}", compiler.program().display());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async {
        Coordinator::new(Arc::new(config), compiler, decoder, workspace)
            .with_watch_path(file.to_path_buf())
            .with_shutdown_signal(shutdown_rx)
            .run()
            .await
    })?;

    log!("preview"; "session closed");
    Ok(())
}
