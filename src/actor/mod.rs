//! Actor System for the Live Preview Pipeline
//!
//! Message-passing concurrency for preview mode:
//!
//! ```text
//! SourceWatcher --> CompileScheduler --> PageRenderer --> StatusActor
//!   (watch)          (debounce+seq)        (pages)        (terminal)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `scheduler` - Debounced compilation with newest-wins supersession
//! - `renderer` - Per-artifact page render sessions
//! - `watcher` - Source file watcher
//! - `display` - Terminal status display
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod display;
pub mod messages;
pub mod renderer;
pub mod scheduler;
pub mod watcher;

pub use coordinator::{Coordinator, PreviewController};
