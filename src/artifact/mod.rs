//! Artifact Resource Manager
//!
//! Owns the lifecycle of the single most-recent compiled binary and its
//! display handle. Installing a new artifact swaps it in atomically; the
//! previous handle's backing resource is released when the last display
//! reference drops, never while something still shows it.
//!
//! Invariant: after any `install`/`clear` settles (no display holding an old
//! clone), at most one handle remains un-released.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;

/// A compiled binary document plus its display resource.
///
/// The resource is scoped to the handle: dropping the last reference
/// releases it on every exit path, including render abandonment.
pub struct ArtifactHandle {
    id: u64,
    bytes: Arc<[u8]>,
    outstanding: Arc<AtomicUsize>,
}

impl ArtifactHandle {
    /// Monotonic id; newer artifacts always compare greater.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for ArtifactHandle {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactHandle")
            .field("id", &self.id)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Store holding the single live artifact.
pub struct ArtifactStore {
    live: ArcSwapOption<ArtifactHandle>,
    next_id: AtomicU64,
    outstanding: Arc<AtomicUsize>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            live: ArcSwapOption::const_empty(),
            next_id: AtomicU64::new(0),
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrap `bytes` in a new display handle and swap it in as live.
    ///
    /// The previously-live handle (if any) loses its store reference here;
    /// its resource is released as soon as no active display references it.
    pub fn install(&self, bytes: Vec<u8>) -> Arc<ArtifactHandle> {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let handle = Arc::new(ArtifactHandle {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            bytes: bytes.into(),
            outstanding: Arc::clone(&self.outstanding),
        });
        self.live.store(Some(Arc::clone(&handle)));
        handle
    }

    /// Release the live handle, leaving no live artifact.
    pub fn clear(&self) {
        self.live.store(None);
    }

    /// Unconditional release at session end.
    pub fn teardown(&self) {
        self.clear();
    }

    /// The live artifact, if any.
    pub fn live(&self) -> Option<Arc<ArtifactHandle>> {
        self.live.load_full()
    }

    /// Number of handles whose backing resource has not been released yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}
