//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! SourceWatcher --Edit--> CompileScheduler --Render--> PageRenderer
//!                                  \--------- DisplayMsg ---------> StatusActor
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::artifact::ArtifactHandle;

/// Messages to the compile scheduler
#[derive(Debug)]
pub enum SchedulerMsg {
    /// A committed content change; (re)starts the debounce window
    Edit(String),
    /// Manual compile request: cancels any pending window and issues now
    CompileNow(String),
    /// Shutdown
    Shutdown,
}

/// Messages to the page renderer
#[derive(Debug)]
pub enum RenderMsg {
    /// A new artifact became live; start a fresh render session
    Render(Arc<ArtifactHandle>),
    /// Shutdown
    Shutdown,
}

/// Messages to the status display
#[derive(Debug)]
pub enum DisplayMsg {
    /// A compile call was issued
    CompileStarted { sequence: u64 },
    /// Outcome applied: a new artifact is live
    CompileApplied {
        sequence: u64,
        bytes: usize,
        elapsed: Duration,
    },
    /// Outcome applied: the message is now the displayed state
    CompileFailed { sequence: u64, message: String },
    /// Outcome discarded: a strictly newer request already exists
    CompileSuperseded { sequence: u64 },
    /// Document opened, page count known
    RenderStarted { pages: usize },
    /// One page fully drawn
    PageRendered { index: usize, pages: usize },
    /// All pages drawn
    RenderComplete { pages: usize },
    /// Decode or draw failure (already-drawn pages remain)
    RenderFailed { message: String },
    /// Outline recomputed after a committed content change
    OutlineUpdated { items: usize },
    /// Shutdown
    Shutdown,
}
