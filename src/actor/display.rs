//! Terminal Status Display
//!
//! Consumes pipeline events and keeps a single overwriting status block, so
//! rapid recompiles do not scroll the terminal. The presentation layer never
//! mutates pipeline state.

use tokio::sync::mpsc;

use super::messages::DisplayMsg;
use crate::logger::WatchStatus;

pub struct StatusActor {
    rx: mpsc::Receiver<DisplayMsg>,
    status: WatchStatus,
}

impl StatusActor {
    pub fn new(rx: mpsc::Receiver<DisplayMsg>) -> Self {
        Self {
            rx,
            status: WatchStatus::new(),
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                DisplayMsg::CompileStarted { sequence } => {
                    self.status.unchanged(&format!("compiling #{sequence}..."));
                }
                DisplayMsg::CompileApplied {
                    sequence,
                    bytes,
                    elapsed,
                } => {
                    self.status.success(&format!(
                        "compiled #{} in {:.1?} ({} KiB)",
                        sequence,
                        elapsed,
                        bytes / 1024
                    ));
                }
                DisplayMsg::CompileFailed { message, .. } => {
                    self.status.error("compile failed", &message);
                }
                DisplayMsg::CompileSuperseded { sequence } => {
                    crate::debug!("compile"; "outcome #{} superseded", sequence);
                }
                DisplayMsg::RenderStarted { pages } => {
                    self.status.unchanged(&format!("rendering {pages} page(s)..."));
                }
                DisplayMsg::PageRendered { index, pages } => {
                    self.status.unchanged(&format!("page {index}/{pages}"));
                }
                DisplayMsg::RenderComplete { pages } => {
                    self.status.success(&format!("{pages} page(s) ready"));
                }
                DisplayMsg::RenderFailed { message } => {
                    self.status.error("render failed", &message);
                }
                DisplayMsg::OutlineUpdated { items } => {
                    crate::debug!("outline"; "{} heading(s)", items);
                }
                DisplayMsg::Shutdown => break,
            }
        }
    }
}
