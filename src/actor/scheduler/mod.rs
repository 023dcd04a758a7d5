//! Compile Scheduler
//!
//! Converts a high-frequency stream of content changes into a low-frequency
//! stream of compile calls, and guarantees the session only ever reflects
//! the outcome of the most recently issued call.
//!
//! State machine: `Idle -> Pending(window) -> InFlight -> Idle`.
//! - A change in `Idle`/`Pending` (re)starts the debounce window.
//! - Window expiry allocates the next sequence and issues the call.
//! - A manual trigger cancels the window and issues immediately.
//! - A change while a call is in flight arms a new window without touching
//!   the in-flight call; overlapping calls are possible and safe.
//! - An arriving outcome applies only if its sequence is the newest issued
//!   so far; anything else is discarded unconditionally.
//!
//! Sequence-based supersession is required because compile latency is
//! content-dependent: a later-issued, faster compile could otherwise be
//! overwritten by an earlier, slower one.

mod debounce;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use debounce::Debounce;

use super::messages::{DisplayMsg, RenderMsg, SchedulerMsg};
use crate::compile::{CompileOutcome, CompileRequest, Compiler};
use crate::session::PreviewSession;

/// Buffer for the internal outcome channel; outcomes are tiny and the
/// scheduler drains them promptly.
const OUTCOME_BUFFER: usize = 32;

pub struct CompileScheduler<C: Compiler> {
    rx: mpsc::Receiver<SchedulerMsg>,
    compiler: Arc<C>,
    session: Arc<PreviewSession>,
    render_tx: mpsc::Sender<RenderMsg>,
    display_tx: mpsc::Sender<DisplayMsg>,
    debounce: Debounce,
    outcome_tx: mpsc::Sender<CompileOutcome>,
    outcome_rx: mpsc::Receiver<CompileOutcome>,
    /// Highest sequence issued so far — the only one whose outcome applies.
    issued: u64,
    /// Highest sequence whose outcome has arrived (applied or discarded).
    settled: u64,
}

impl<C: Compiler> CompileScheduler<C> {
    pub fn new(
        rx: mpsc::Receiver<SchedulerMsg>,
        compiler: Arc<C>,
        session: Arc<PreviewSession>,
        render_tx: mpsc::Sender<RenderMsg>,
        display_tx: mpsc::Sender<DisplayMsg>,
        window: Duration,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_BUFFER);
        Self {
            rx,
            compiler,
            session,
            render_tx,
            display_tx,
            debounce: Debounce::new(window),
            outcome_tx,
            outcome_rx,
            issued: 0,
            settled: 0,
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                msg = self.rx.recv() => match msg {
                    Some(SchedulerMsg::Edit(snapshot)) => self.debounce.arm(snapshot),
                    Some(SchedulerMsg::CompileNow(snapshot)) => {
                        self.debounce.cancel();
                        self.issue(snapshot).await;
                    }
                    Some(SchedulerMsg::Shutdown) | None => break,
                },

                Some(outcome) = self.outcome_rx.recv() => self.apply(outcome).await,

                _ = tokio::time::sleep(self.debounce.sleep_duration()) => {
                    if let Some(snapshot) = self.debounce.take_if_ready() {
                        self.issue(snapshot).await;
                    }
                }
            }
        }
        crate::debug!("compile"; "scheduler stopped at sequence {}", self.issued);
    }

    /// Allocate the next sequence, snapshot the content, issue the call.
    async fn issue(&mut self, snapshot: String) {
        self.issued += 1;
        let request = CompileRequest::new(self.issued, snapshot);
        self.session.set_compiling(true);
        crate::debug!("compile"; "issuing #{} ({} bytes)", request.sequence, request.source.len());
        let _ = self
            .display_tx
            .send(DisplayMsg::CompileStarted { sequence: request.sequence })
            .await;

        let compiler = Arc::clone(&self.compiler);
        let outcome_tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = compiler.compile(&request.source).await;
            let outcome = CompileOutcome {
                sequence: request.sequence,
                elapsed: request.issued_at.elapsed(),
                result,
            };
            // Receiver lives as long as the scheduler; a failed send only
            // happens during shutdown.
            let _ = outcome_tx.send(outcome).await;
        });
    }

    /// Apply or discard an arriving outcome.
    async fn apply(&mut self, outcome: CompileOutcome) {
        self.settled = self.settled.max(outcome.sequence);
        self.session.set_compiling(self.issued > self.settled);

        if outcome.sequence != self.issued {
            // A strictly newer request is in flight or already applied.
            crate::debug!("compile"; "discarding superseded outcome #{}", outcome.sequence);
            let _ = self
                .display_tx
                .send(DisplayMsg::CompileSuperseded { sequence: outcome.sequence })
                .await;
            return;
        }

        match outcome.result {
            Ok(bytes) => {
                let size = bytes.len();
                let handle = self.session.install_artifact(bytes);
                let _ = self.render_tx.send(RenderMsg::Render(handle)).await;
                let _ = self
                    .display_tx
                    .send(DisplayMsg::CompileApplied {
                        sequence: outcome.sequence,
                        bytes: size,
                        elapsed: outcome.elapsed,
                    })
                    .await;
            }
            Err(error) => {
                let message = error.to_string();
                self.session.fail_compile(message.clone());
                let _ = self
                    .display_tx
                    .send(DisplayMsg::CompileFailed {
                        sequence: outcome.sequence,
                        message,
                    })
                    .await;
            }
        }
    }
}
