//! Source File Watcher
//!
//! Bridges notify's sync callback into the actor world and commits the
//! watched file's content into the workspace on every real change. The
//! scheduler's debounce window does the collapsing; this actor only filters
//! noise (metadata-only events, editor temp files).
//!
//! The watched root is the file's parent directory: editors that save by
//! rename would otherwise detach a watch on the file itself.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use super::coordinator::PreviewController;

pub struct SourceWatcher {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    path: PathBuf,
    controller: PreviewController,
}

impl SourceWatcher {
    /// Create a watcher for one source file.
    ///
    /// The watcher starts immediately, buffering events until `run` drains
    /// them.
    pub fn new(path: PathBuf, controller: PreviewController) -> notify::Result<Self> {
        // Sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        watcher.watch(&root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            notify_rx,
            watcher,
            path,
            controller,
        })
    }

    /// Run the actor event loop.
    pub async fn run(self) {
        let Self {
            notify_rx,
            watcher,
            path,
            controller,
        } = self;
        let _watcher = watcher;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            if !is_relevant(&event, &path) {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    crate::debug!("watch"; "change: {}", path.display());
                    controller.update_active_content(content).await;
                }
                // Editors replace files during save; the follow-up event
                // catches the readable state.
                Err(e) => crate::debug!("watch"; "unreadable after change: {}", e),
            }
        }
    }
}

/// Does this event concern the watched file's content?
fn is_relevant(event: &notify::Event, path: &Path) -> bool {
    use notify::EventKind;

    match event.kind {
        EventKind::Create(_) => {}
        // Ignore metadata-only changes (mtime/atime/chmod noise)
        EventKind::Modify(modify) => {
            if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                return false;
            }
        }
        _ => return false,
    }

    // The watch root is the parent directory; notify reports absolute
    // paths, so match on the file name.
    event
        .paths
        .iter()
        .any(|p| p.file_name() == path.file_name())
}
