use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::CompileScheduler;
use crate::actor::messages::{DisplayMsg, RenderMsg, SchedulerMsg};
use crate::compile::Compiler;
use crate::error::CompileError;
use crate::session::PreviewSession;
use crate::workspace::Workspace;

const WINDOW: Duration = Duration::from_millis(1000);

/// Compiler with per-source scripted latency and result.
#[derive(Default)]
struct ScriptedCompiler {
    calls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<String, (Duration, Result<Vec<u8>, CompileError>)>>,
}

impl ScriptedCompiler {
    fn respond(&self, source: &str, delay: Duration, result: Result<Vec<u8>, CompileError>) {
        self.responses
            .lock()
            .insert(source.to_string(), (delay, result));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Compiler for ScriptedCompiler {
    async fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        self.calls.lock().push(source.to_string());
        let (delay, result) = self
            .responses
            .lock()
            .get(source)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(b"%PDF-default".to_vec())));
        tokio::time::sleep(delay).await;
        result
    }
}

struct Harness {
    scheduler_tx: mpsc::Sender<SchedulerMsg>,
    render_rx: mpsc::Receiver<RenderMsg>,
    display_rx: mpsc::Receiver<DisplayMsg>,
    session: Arc<PreviewSession>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

fn spawn_scheduler(compiler: Arc<ScriptedCompiler>) -> Harness {
    let (scheduler_tx, scheduler_rx) = mpsc::channel(16);
    let (render_tx, render_rx) = mpsc::channel(16);
    let (display_tx, display_rx) = mpsc::channel(256);
    let session = Arc::new(PreviewSession::new(Workspace::new()));
    let scheduler = CompileScheduler::new(
        scheduler_rx,
        compiler,
        Arc::clone(&session),
        render_tx,
        display_tx,
        WINDOW,
    );
    let handle = tokio::spawn(scheduler.run());
    Harness {
        scheduler_tx,
        render_rx,
        display_rx,
        session,
        handle,
    }
}

fn drain_display(rx: &mut mpsc::Receiver<DisplayMsg>) -> Vec<DisplayMsg> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn drain_render(rx: &mut mpsc::Receiver<RenderMsg>) -> Vec<RenderMsg> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_debounce_collapses_rapid_edits() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    for i in 0..5 {
        h.scheduler_tx
            .send(SchedulerMsg::Edit(format!("draft {i}")))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(1500)).await;

    // One compile, with the content present when the window expired.
    assert_eq!(compiler.calls(), vec!["draft 4"]);
    assert_eq!(drain_render(&mut h.render_rx).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manual_trigger_bypasses_debounce() {
    let compiler = Arc::new(ScriptedCompiler::default());
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    h.scheduler_tx
        .send(SchedulerMsg::Edit("draft".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(compiler.calls().is_empty(), "window has not expired yet");

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("draft".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(compiler.calls().len(), 1, "manual trigger compiles now");

    // The pending window was cancelled, not left to fire a duplicate.
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(compiler.calls().len(), 1);
    assert_eq!(drain_render(&mut h.render_rx).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_supersession_newest_sequence_wins() {
    let compiler = Arc::new(ScriptedCompiler::default());
    compiler.respond(
        "slow",
        Duration::from_millis(500),
        Ok(b"%PDF-slow".to_vec()),
    );
    compiler.respond("fast", Duration::from_millis(10), Ok(b"%PDF-fast".to_vec()));
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("slow".into()))
        .await
        .unwrap();
    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("fast".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(compiler.calls().len(), 2);

    // The later-issued request's outcome is the final state, even though the
    // earlier one finished last.
    let live = h.session.live_artifact().expect("artifact installed");
    assert_eq!(live.bytes(), b"%PDF-fast");
    assert!(!h.session.is_compiling());

    let render = drain_render(&mut h.render_rx);
    assert_eq!(render.len(), 1, "superseded outcome never reaches the renderer");

    let display = drain_display(&mut h.display_rx);
    assert!(display
        .iter()
        .any(|m| matches!(m, DisplayMsg::CompileSuperseded { sequence: 1 })));
    assert!(display
        .iter()
        .any(|m| matches!(m, DisplayMsg::CompileApplied { sequence: 2, .. })));
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_never_displayed_over_newer_success() {
    let compiler = Arc::new(ScriptedCompiler::default());
    compiler.respond(
        "bad",
        Duration::from_millis(10),
        Err(CompileError::Compiler("! Undefined control sequence.".into())),
    );
    compiler.respond(
        "good",
        Duration::from_millis(100),
        Ok(b"%PDF-good".to_vec()),
    );
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    // The failure for the older sequence arrives while the newer request is
    // still in flight: it must be discarded, not displayed.
    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("bad".into()))
        .await
        .unwrap();
    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("good".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(h.session.compile_error().is_none());
    assert_eq!(
        h.session.live_artifact().unwrap().bytes(),
        b"%PDF-good"
    );

    let display = drain_display(&mut h.display_rx);
    assert!(!display
        .iter()
        .any(|m| matches!(m, DisplayMsg::CompileFailed { .. })));
    assert!(display
        .iter()
        .any(|m| matches!(m, DisplayMsg::CompileSuperseded { sequence: 1 })));
}

#[tokio::test(start_paused = true)]
async fn test_failure_clears_artifact_and_sets_error() {
    let compiler = Arc::new(ScriptedCompiler::default());
    compiler.respond("ok", Duration::ZERO, Ok(b"%PDF-ok".to_vec()));
    compiler.respond(
        "broken",
        Duration::ZERO,
        Err(CompileError::Compiler("! Missing $ inserted.".into())),
    );
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("ok".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.session.live_artifact().is_some());

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("broken".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(h.session.live_artifact().is_none());
    let error = h.session.compile_error().expect("error surfaced");
    assert!(error.contains("Missing $ inserted"));

    // No leaked handles once the renderer side lets go of its message.
    drop(drain_render(&mut h.render_rx));
    assert_eq!(h.session.outstanding_handles(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_edit_while_in_flight_arms_new_window() {
    let compiler = Arc::new(ScriptedCompiler::default());
    compiler.respond(
        "slow",
        Duration::from_millis(2000),
        Ok(b"%PDF-1".to_vec()),
    );
    compiler.respond("next", Duration::ZERO, Ok(b"%PDF-2".to_vec()));
    let mut h = spawn_scheduler(Arc::clone(&compiler));

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("slow".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The in-flight call is left to complete naturally; this edit arms an
    // independent window.
    h.scheduler_tx
        .send(SchedulerMsg::Edit("next".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(3000)).await;

    assert_eq!(compiler.calls().len(), 2);
    assert_eq!(h.session.live_artifact().unwrap().bytes(), b"%PDF-2");
    assert!(!h.session.is_compiling());

    let display = drain_display(&mut h.display_rx);
    assert!(display
        .iter()
        .any(|m| matches!(m, DisplayMsg::CompileSuperseded { sequence: 1 })));
}

#[tokio::test(start_paused = true)]
async fn test_compiling_flag_tracks_outstanding_work() {
    let compiler = Arc::new(ScriptedCompiler::default());
    compiler.respond("a", Duration::from_millis(300), Ok(b"%PDF-a".to_vec()));
    let h = spawn_scheduler(Arc::clone(&compiler));

    h.scheduler_tx
        .send(SchedulerMsg::CompileNow("a".into()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.session.is_compiling());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!h.session.is_compiling());
}
