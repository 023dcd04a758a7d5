//! Shared preview session state.
//!
//! One explicit session object, owned by the coordinator and passed by
//! reference to the actors — no ambient singletons. Each shared field has a
//! single mutator: the scheduler applies compile outcomes (artifact, error,
//! compiling flag), the renderer owns the render slot, the controller owns
//! the workspace and outline. The display layer only reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, MutexGuard};

use crate::artifact::{ArtifactHandle, ArtifactStore};
use crate::outline::OutlineItem;
use crate::render::session::RenderSession;
use crate::workspace::Workspace;

pub struct PreviewSession {
    workspace: Mutex<Workspace>,
    artifacts: ArtifactStore,
    render: ArcSwapOption<RenderSession>,
    error: Mutex<Option<String>>,
    compiling: AtomicBool,
    outline: Mutex<Vec<OutlineItem>>,
}

impl PreviewSession {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Mutex::new(workspace),
            artifacts: ArtifactStore::new(),
            render: ArcSwapOption::const_empty(),
            error: Mutex::new(None),
            compiling: AtomicBool::new(false),
            outline: Mutex::new(Vec::new()),
        }
    }

    /// Exclusive access to the workspace. Never held across an await.
    pub fn workspace(&self) -> MutexGuard<'_, Workspace> {
        self.workspace.lock()
    }

    // -- compile state (mutated only by the scheduler) -----------------------

    pub fn set_compiling(&self, on: bool) {
        self.compiling.store(on, Ordering::SeqCst);
    }

    pub fn is_compiling(&self) -> bool {
        self.compiling.load(Ordering::SeqCst)
    }

    /// Apply a successful outcome: the new artifact becomes live and any
    /// displayed error clears.
    pub fn install_artifact(&self, bytes: Vec<u8>) -> Arc<ArtifactHandle> {
        *self.error.lock() = None;
        self.artifacts.install(bytes)
    }

    /// Apply a failed outcome: the message becomes the displayed state and
    /// the live artifact is cleared.
    pub fn fail_compile(&self, message: String) {
        self.artifacts.clear();
        *self.error.lock() = Some(message);
    }

    pub fn compile_error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn live_artifact(&self) -> Option<Arc<ArtifactHandle>> {
        self.artifacts.live()
    }

    /// Display handles not yet released (resource-safety contract).
    pub fn outstanding_handles(&self) -> usize {
        self.artifacts.outstanding()
    }

    // -- render slot (mutated only by the renderer) --------------------------

    /// Install a fresh render session, retiring the previous one.
    pub fn set_render_session(&self, session: Arc<RenderSession>) {
        if let Some(previous) = self.render.swap(Some(session)) {
            previous.retire();
        }
    }

    pub fn render_session(&self) -> Option<Arc<RenderSession>> {
        self.render.load_full()
    }

    // -- outline (mutated only by the controller) ----------------------------

    pub fn set_outline(&self, items: Vec<OutlineItem>) {
        *self.outline.lock() = items;
    }

    pub fn outline(&self) -> Vec<OutlineItem> {
        self.outline.lock().clone()
    }

    // -- lifecycle -----------------------------------------------------------

    /// Unconditional release at session end.
    pub fn teardown(&self) {
        if let Some(previous) = self.render.swap(None) {
            previous.retire();
        }
        self.artifacts.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_clears_error() {
        let session = PreviewSession::new(Workspace::new());
        session.fail_compile("! Undefined control sequence.".into());
        assert!(session.compile_error().is_some());
        assert!(session.live_artifact().is_none());

        let handle = session.install_artifact(b"%PDF-1".to_vec());
        drop(handle);
        assert!(session.compile_error().is_none());
        assert!(session.live_artifact().is_some());
    }

    #[test]
    fn test_fail_clears_artifact() {
        let session = PreviewSession::new(Workspace::new());
        let handle = session.install_artifact(b"%PDF-1".to_vec());
        drop(handle);
        session.fail_compile("boom".into());
        assert!(session.live_artifact().is_none());
        assert_eq!(session.compile_error().as_deref(), Some("boom"));
    }

    #[test]
    fn test_replacing_render_session_retires_previous() {
        let session = PreviewSession::new(Workspace::new());
        let first = Arc::new(RenderSession::new(1));
        session.set_render_session(Arc::clone(&first));
        assert!(first.is_live());

        let second = Arc::new(RenderSession::new(2));
        session.set_render_session(Arc::clone(&second));
        assert!(!first.is_live());
        assert!(second.is_live());
        assert_eq!(session.render_session().unwrap().artifact_id(), 2);
    }

    #[test]
    fn test_teardown_releases_everything() {
        let session = PreviewSession::new(Workspace::new());
        let handle = session.install_artifact(b"%PDF-1".to_vec());
        drop(handle);
        let render = Arc::new(RenderSession::new(1));
        session.set_render_session(Arc::clone(&render));

        session.teardown();
        assert!(session.live_artifact().is_none());
        assert!(session.render_session().is_none());
        assert!(!render.is_live());
        assert_eq!(session.outstanding_handles(), 0);
    }
}
