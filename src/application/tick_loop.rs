use std::time::{Duration, Instant};

/// Scheduling decisions of the render loop, free of any timer or runtime.
///
/// A single `next_tick` slot holds the pending tick, so starting twice only
/// moves that slot and can never produce a second loop.
#[derive(Debug, Clone, Default)]
pub struct TickLoop {
    foreground_interval: Option<Duration>,
    background_interval: Option<Duration>,
    running: bool,
    surface_ready: bool,
    backgrounded: bool,
    /// Stopped by a tick in background with background ticking disabled.
    parked: bool,
    /// Stopped by an explicit `stop()`; only a new surface restarts it.
    halted: bool,
    next_tick: Option<Instant>,
}

fn positive_interval(interval_ms: i64) -> Option<Duration> {
    u64::try_from(interval_ms)
        .ok()
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
}

impl TickLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_enabled(&self) -> bool {
        self.foreground_interval.is_some()
    }

    pub fn surface_ready(&self) -> bool {
        self.surface_ready
    }

    pub fn backgrounded(&self) -> bool {
        self.backgrounded
    }

    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Backgrounded from the view's point of view: hidden, or without a surface.
    pub fn effective_backgrounded(&self) -> bool {
        self.backgrounded || !self.surface_ready
    }

    pub fn is_parked(&self) -> bool {
        self.parked
    }

    pub fn configure(
        &mut self,
        foreground_interval_ms: i64,
        background_interval_ms: i64,
        now: Instant,
    ) {
        self.foreground_interval = positive_interval(foreground_interval_ms);
        self.background_interval = positive_interval(background_interval_ms);

        if self.foreground_interval.is_none() {
            self.cancel();
        } else if !self.running
            && !self.halted
            && self.surface_ready
            && self.current_interval().is_some()
        {
            self.start(now);
        } else if self.running && !self.surface_ready && self.background_interval.is_none() {
            self.cancel();
        }
    }

    pub fn on_surface_available(&mut self, now: Instant) {
        self.surface_ready = true;
        if self.is_enabled() {
            self.start(now);
        }
    }

    pub fn on_surface_unavailable(&mut self) {
        self.surface_ready = false;
        if self.background_interval.is_none() {
            self.cancel();
        }
    }

    pub fn on_visibility_changed(&mut self, backgrounded: bool, now: Instant) {
        self.backgrounded = backgrounded;
        if !backgrounded && self.parked && self.surface_ready && self.is_enabled() {
            self.start(now);
        }
    }

    /// Idempotent. The loop stays stopped until the next `on_surface_available`.
    pub fn stop(&mut self) {
        self.cancel();
        self.halted = true;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.running && self.next_tick.is_some_and(|deadline| deadline <= now)
    }

    /// Claims the pending tick. Returns the backgrounded flag to hand to the
    /// view, or `None` when no tick is due.
    pub fn begin_tick(&mut self, now: Instant) -> Option<bool> {
        if !self.is_due(now) {
            return None;
        }
        self.next_tick = None;
        Some(self.effective_backgrounded())
    }

    /// Reschedules after a tick that started at `tick_started`.
    pub fn finish_tick(&mut self, tick_started: Instant) {
        if !self.running {
            return;
        }
        match self.current_interval() {
            Some(interval) => self.next_tick = Some(tick_started + interval),
            None => {
                self.cancel();
                self.parked = true;
            }
        }
    }

    pub fn current_interval(&self) -> Option<Duration> {
        if self.effective_backgrounded() {
            self.background_interval
        } else {
            self.foreground_interval
        }
    }

    fn start(&mut self, now: Instant) {
        self.running = true;
        self.parked = false;
        self.halted = false;
        self.next_tick = Some(now);
    }

    fn cancel(&mut self) {
        self.running = false;
        self.parked = false;
        self.next_tick = None;
    }
}
