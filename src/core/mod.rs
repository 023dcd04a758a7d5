//! Process lifecycle state.
//!
//! One concern: shutdown. Ctrl+C sets a flag and pings a channel so the
//! actor system can drain and release its resources before exit.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the actor system
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Request shutdown programmatically (same path as Ctrl+C)
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    if let Some(tx) = SHUTDOWN_TX.get() {
        let _ = tx.try_send(());
    }
}

/// Install the global Ctrl+C handler.
///
/// Returns the receiver the pipeline polls for the shutdown signal. Must be
/// called at most once, before any blocking work starts.
pub fn setup_shutdown_handler() -> anyhow::Result<crossbeam::channel::Receiver<()>> {
    let (tx, rx) = crossbeam::channel::bounded(1);
    SHUTDOWN_TX
        .set(tx)
        .map_err(|_| anyhow::anyhow!("shutdown handler already installed"))?;

    ctrlc::set_handler(request_shutdown)?;
    Ok(rx)
}
