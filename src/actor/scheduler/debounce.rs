use std::time::Duration;

use tokio::time::Instant;

/// Pure debounce state: the latest pending snapshot and when the window
/// re-arms. No compile logic, no channels.
///
/// Every `arm` replaces the snapshot and restarts the window, so a burst of
/// edits collapses to one snapshot — the content present when the window
/// finally expires.
pub(super) struct Debounce {
    window: Duration,
    pending: Option<String>,
    armed_at: Option<Instant>,
}

impl Debounce {
    pub(super) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            armed_at: None,
        }
    }

    /// (Re)start the window with a fresh snapshot.
    pub(super) fn arm(&mut self, snapshot: String) {
        self.pending = Some(snapshot);
        self.armed_at = Some(Instant::now());
    }

    pub(super) fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the snapshot if the window has fully elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<String> {
        let armed_at = self.armed_at?;
        if armed_at.elapsed() < self.window {
            return None;
        }
        self.armed_at = None;
        self.pending.take()
    }

    /// Cancel the pending window, returning the unsent snapshot.
    pub(super) fn cancel(&mut self) -> Option<String> {
        self.armed_at = None;
        self.pending.take()
    }

    /// Precise sleep duration until the window can next expire.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.armed_at {
            Some(armed_at) => self
                .window
                .saturating_sub(armed_at.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}
