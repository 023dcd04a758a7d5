//! Pipeline Coordinator
//!
//! Wires up the preview actor system:
//! - Creates communication channels
//! - Owns the session object and hands it to the actors
//! - Exposes the controller handle the front end drives
//!
//! ```text
//! controller/watcher --SchedulerMsg--> scheduler --RenderMsg--> renderer
//!                            \________ DisplayMsg ________/--> status
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::display::StatusActor;
use super::messages::{DisplayMsg, RenderMsg, SchedulerMsg};
use super::renderer::PageRenderer;
use super::scheduler::CompileScheduler;
use super::watcher::SourceWatcher;
use crate::compile::Compiler;
use crate::config::PreviewConfig;
use crate::outline;
use crate::render::Decoder;
use crate::session::PreviewSession;
use crate::workspace::Workspace;

const CHANNEL_BUFFER: usize = 64;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator<C: Compiler, D: Decoder> {
    config: Arc<PreviewConfig>,
    compiler: C,
    decoder: D,
    workspace: Workspace,
    watch_path: Option<PathBuf>,
    shutdown_rx: Option<Receiver<()>>,
}

impl<C: Compiler, D: Decoder> Coordinator<C, D> {
    pub fn new(config: Arc<PreviewConfig>, compiler: C, decoder: D, workspace: Workspace) -> Self {
        Self {
            config,
            compiler,
            decoder,
            workspace,
            watch_path: None,
            shutdown_rx: None,
        }
    }

    /// Watch a source file and feed its changes into the workspace.
    pub fn with_watch_path(mut self, path: PathBuf) -> Self {
        self.watch_path = Some(path);
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Wire up channels and actors. Returns the controller and the pipeline
    /// to run.
    pub fn build(self) -> Result<(PreviewController, Pipeline<C, D>)> {
        let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerMsg>(CHANNEL_BUFFER);
        let (render_tx, render_rx) = mpsc::channel::<RenderMsg>(CHANNEL_BUFFER);
        let (display_tx, display_rx) = mpsc::channel::<DisplayMsg>(CHANNEL_BUFFER);

        let session = Arc::new(PreviewSession::new(self.workspace));
        let controller = PreviewController {
            session: Arc::clone(&session),
            scheduler_tx: scheduler_tx.clone(),
            display_tx: display_tx.clone(),
        };

        let scheduler = CompileScheduler::new(
            scheduler_rx,
            Arc::new(self.compiler),
            Arc::clone(&session),
            render_tx.clone(),
            display_tx.clone(),
            Duration::from_millis(self.config.compile.debounce_ms),
        );
        let renderer = PageRenderer::new(
            render_rx,
            Arc::new(self.decoder),
            Arc::clone(&session),
            display_tx.clone(),
            self.config.render.scale,
        );
        let status = StatusActor::new(display_rx);

        let watcher = match self.watch_path {
            Some(path) => Some(
                SourceWatcher::new(path, controller.clone())
                    .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?,
            ),
            None => None,
        };

        let pipeline = Pipeline {
            session,
            controller: controller.clone(),
            scheduler,
            renderer,
            status,
            watcher,
            initial_compile: self.config.compile.initial,
            shutdown_rx: self.shutdown_rx,
            scheduler_tx,
            render_tx,
            display_tx,
        };

        Ok((controller, pipeline))
    }

    /// Build and run until shutdown.
    pub async fn run(self) -> Result<()> {
        let (_controller, pipeline) = self.build()?;
        pipeline.run().await
    }
}

/// The wired actor system, ready to run.
pub struct Pipeline<C: Compiler, D: Decoder> {
    session: Arc<PreviewSession>,
    controller: PreviewController,
    scheduler: CompileScheduler<C>,
    renderer: PageRenderer<D>,
    status: StatusActor,
    watcher: Option<SourceWatcher>,
    initial_compile: bool,
    shutdown_rx: Option<Receiver<()>>,
    scheduler_tx: mpsc::Sender<SchedulerMsg>,
    render_tx: mpsc::Sender<RenderMsg>,
    display_tx: mpsc::Sender<DisplayMsg>,
}

impl<C: Compiler, D: Decoder> Pipeline<C, D> {
    pub fn session(&self) -> Arc<PreviewSession> {
        Arc::clone(&self.session)
    }

    pub fn controller(&self) -> PreviewController {
        self.controller.clone()
    }

    /// Run the actor system until shutdown, then release all resources.
    pub async fn run(self) -> Result<()> {
        let Self {
            session,
            controller,
            scheduler,
            renderer,
            status,
            watcher,
            initial_compile,
            shutdown_rx,
            scheduler_tx,
            render_tx,
            display_tx,
        } = self;

        crate::debug!("actor"; "start");
        let scheduler_handle = tokio::spawn(scheduler.run());
        let renderer_handle = tokio::spawn(renderer.run());
        let status_handle = tokio::spawn(status.run());
        if let Some(watcher) = watcher {
            tokio::spawn(watcher.run());
        }

        // One immediate, un-debounced compile of the initial content; every
        // later edit goes through the debounce window.
        if initial_compile {
            controller.compile_now().await;
        }

        match shutdown_rx {
            Some(rx) => {
                loop {
                    if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                        crate::debug!("actor"; "shutdown signal received");
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                let _ = scheduler_tx.send(SchedulerMsg::Shutdown).await;
                let _ =
                    tokio::time::timeout(Duration::from_millis(500), scheduler_handle).await;
            }
            // Without an external signal the pipeline runs until the
            // scheduler stops (controller shutdown or all senders dropped).
            None => {
                let _ = scheduler_handle.await;
            }
        }

        let _ = render_tx.send(RenderMsg::Shutdown).await;
        let _ = display_tx.send(DisplayMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), renderer_handle).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), status_handle).await;

        session.teardown();
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}

/// Handle the front end drives: edits, document switching, manual compiles.
///
/// Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct PreviewController {
    session: Arc<PreviewSession>,
    scheduler_tx: mpsc::Sender<SchedulerMsg>,
    display_tx: mpsc::Sender<DisplayMsg>,
}

impl PreviewController {
    pub fn session(&self) -> Arc<PreviewSession> {
        Arc::clone(&self.session)
    }

    /// Replace the active document's edit buffer. The sole trigger that
    /// feeds the compile scheduler.
    pub async fn update_active_content(&self, text: impl Into<String>) {
        let text = text.into();
        self.session.workspace().update_active_content(text.clone());
        self.refresh_outline(&text).await;
        let _ = self.scheduler_tx.send(SchedulerMsg::Edit(text)).await;
    }

    /// Compile the current buffer now, bypassing the debounce window.
    pub async fn compile_now(&self) {
        let snapshot = self.session.workspace().active_content().to_string();
        let _ = self
            .scheduler_tx
            .send(SchedulerMsg::CompileNow(snapshot))
            .await;
    }

    /// Add a document and make it active. Returns the canonical name, or
    /// `None` for a blank name.
    pub async fn add_document(&self, name: &str) -> Option<String> {
        let (canonical, created, content) = {
            let mut workspace = self.session.workspace();
            let (canonical, created) = workspace.add_document(name)?;
            (canonical, created, workspace.active_content().to_string())
        };
        if created {
            self.refresh_outline(&content).await;
        }
        Some(canonical)
    }

    /// Switch the active document. Returns whether a switch happened.
    pub async fn select_document(&self, name: &str) -> bool {
        let switched = {
            let mut workspace = self.session.workspace();
            workspace
                .select_document(name)
                .then(|| workspace.active_content().to_string())
        };
        if let Some(content) = &switched {
            self.refresh_outline(content).await;
        }
        switched.is_some()
    }

    /// Stop the pipeline.
    pub async fn shutdown(&self) {
        let _ = self.scheduler_tx.send(SchedulerMsg::Shutdown).await;
    }

    async fn refresh_outline(&self, source: &str) {
        let items = outline::extract(source);
        let count = items.len();
        self.session.set_outline(items);
        let _ = self
            .display_tx
            .send(DisplayMsg::OutlineUpdated { items: count })
            .await;
    }
}
