//! Compiler collaborator boundary.
//!
//! ```text
//! CompileRequest --> Compiler --> CompileOutcome
//! ```
//!
//! The compiler is an opaque remote procedure with variable, content-
//! dependent latency. Requests carry a monotonically increasing sequence
//! number — the sole ordering key for supersession. Content equality is
//! deliberately not used to deduplicate: two distinct edits can produce
//! identical text.

mod tectonic;

pub use tectonic::TectonicCompiler;

use std::future::Future;
use std::time::{Duration, Instant};

use crate::error::CompileError;

/// One issued compile call.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub sequence: u64,
    pub source: String,
    pub issued_at: Instant,
}

impl CompileRequest {
    pub fn new(sequence: u64, source: String) -> Self {
        Self {
            sequence,
            source,
            issued_at: Instant::now(),
        }
    }
}

/// Result of one compile call, tagged with the originating request's
/// sequence so stale outcomes can be discarded on arrival.
#[derive(Debug)]
pub struct CompileOutcome {
    pub sequence: u64,
    pub elapsed: Duration,
    pub result: Result<Vec<u8>, CompileError>,
}

/// The compilation collaborator.
///
/// Invoked once per issued request; latency and failure modes are opaque to
/// the pipeline. A returned error is an expected outcome (malformed markup),
/// not an exceptional condition.
pub trait Compiler: Send + Sync + 'static {
    fn compile(&self, source: &str) -> impl Future<Output = Result<Vec<u8>, CompileError>> + Send;
}
