//! Per-artifact render session state.
//!
//! One `RenderSession` exists per live artifact. It is never mutated after
//! abandonment: the instant a newer artifact becomes live, the session is
//! retired via its liveness token and the render task stops appending.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::Surface;

/// Renderer status, observed read-only by the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    Idle,
    Loading,
    Rendering,
    Complete,
    Error(String),
}

/// One fully drawn page.
#[derive(Debug)]
pub struct RenderedPage {
    pub index: usize,
    pub surface: Surface,
}

/// The ordered, cancellable state of turning one artifact into pages.
pub struct RenderSession {
    artifact_id: u64,
    /// Advisory liveness token. Cleared on retirement; a pending decode is
    /// allowed to finish but its result is discarded.
    live: AtomicBool,
    inner: Mutex<Inner>,
}

struct Inner {
    status: RenderStatus,
    page_count: usize,
    pages: Vec<RenderedPage>,
}

/// Read-only view for the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub artifact_id: u64,
    pub status: RenderStatus,
    pub page_count: usize,
    pub rendered: usize,
}

impl RenderSession {
    pub fn new(artifact_id: u64) -> Self {
        Self {
            artifact_id,
            live: AtomicBool::new(true),
            inner: Mutex::new(Inner {
                status: RenderStatus::Idle,
                page_count: 0,
                pages: Vec::new(),
            }),
        }
    }

    pub fn artifact_id(&self) -> u64 {
        self.artifact_id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Abandon this session. Idempotent.
    pub fn retire(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn set_status(&self, status: RenderStatus) {
        self.inner.lock().status = status;
    }

    /// Transition to `Rendering` with a known page count.
    pub fn begin_rendering(&self, page_count: usize) {
        let mut inner = self.inner.lock();
        inner.page_count = page_count;
        inner.status = RenderStatus::Rendering;
    }

    pub fn push_page(&self, page: RenderedPage) {
        self.inner.lock().pages.push(page);
    }

    pub fn status(&self) -> RenderStatus {
        self.inner.lock().status.clone()
    }

    pub fn page_count(&self) -> usize {
        self.inner.lock().page_count
    }

    /// Number of pages appended so far.
    pub fn rendered(&self) -> usize {
        self.inner.lock().pages.len()
    }

    /// Indices of appended pages, in append order.
    pub fn page_indices(&self) -> Vec<usize> {
        self.inner.lock().pages.iter().map(|p| p.index).collect()
    }

    /// Read-only access to the drawn pages (display boundary).
    pub fn with_pages<R>(&self, f: impl FnOnce(&[RenderedPage]) -> R) -> R {
        f(&self.inner.lock().pages)
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let inner = self.inner.lock();
        RenderSnapshot {
            artifact_id: self.artifact_id,
            status: inner.status.clone(),
            page_count: inner.page_count,
            rendered: inner.pages.len(),
        }
    }
}
