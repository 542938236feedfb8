use std::time::Duration;

/// Something that invalidates the current reflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflowEvent {
    /// The graph was rebuilt (new data or new filters).
    NodeSetChanged,
    /// A mounted node reported a new size.
    DimensionsChanged(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowReason {
    NodeSetChanged,
    DimensionsChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflowAction {
    /// Nothing is pending.
    Idle,
    /// A reflow is pending; the quiet window ends after this long.
    Wait(Duration),
    /// The quiet window elapsed. `coalesced` counts the events folded into
    /// this single run.
    Run {
        reason: ReflowReason,
        coalesced: usize,
    },
}

/// Trailing-edge debouncer for reflow requests.
///
/// Every event restarts the quiet window, so a burst of measurements from
/// one render produces a single reflow once the burst is over. Timestamps
/// are supplied by the host as a monotonic offset from any fixed origin.
#[derive(Debug, Clone)]
pub struct ReflowScheduler {
    window: Duration,
    last_event: Option<Duration>,
    pending: usize,
    node_set_changed: bool,
}

#[cfg(not(target_arch = "wasm32"))]
static CLOCK_ORIGIN: once_cell::sync::Lazy<std::time::Instant> =
    once_cell::sync::Lazy::new(std::time::Instant::now);

#[cfg(not(target_arch = "wasm32"))]
fn monotonic_now() -> Duration {
    CLOCK_ORIGIN.elapsed()
}

impl Default for ReflowScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

impl ReflowScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
            pending: 0,
            node_set_changed: false,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn notify(&mut self, event: ReflowEvent) {
        self.notify_at(event, monotonic_now());
    }

    pub fn notify_at(&mut self, event: ReflowEvent, now: Duration) {
        if event == ReflowEvent::NodeSetChanged {
            self.node_set_changed = true;
        }
        self.pending += 1;
        self.last_event = Some(now);
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn poll(&mut self) -> ReflowAction {
        self.poll_at(monotonic_now())
    }

    pub fn poll_at(&mut self, now: Duration) -> ReflowAction {
        let Some(last) = self.last_event else {
            return ReflowAction::Idle;
        };
        let elapsed = now.saturating_sub(last);
        if elapsed < self.window {
            return ReflowAction::Wait(self.window - elapsed);
        }

        let reason = if self.node_set_changed {
            ReflowReason::NodeSetChanged
        } else {
            ReflowReason::DimensionsChanged
        };
        let coalesced = self.pending;
        self.cancel();
        ReflowAction::Run { reason, coalesced }
    }

    /// Drops the pending run, if any.
    pub fn cancel(&mut self) {
        self.last_event = None;
        self.pending = 0;
        self.node_set_changed = false;
    }

    pub fn time_until_run(&self, now: Duration) -> Option<Duration> {
        let last = self.last_event?;
        let elapsed = now.saturating_sub(last);
        Some(self.window.saturating_sub(elapsed))
    }
}
