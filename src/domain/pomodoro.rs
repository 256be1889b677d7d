use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const ACTIVITY_MINUTES: u64 = 25;
pub const LONG_PAUSE_MINUTES: u64 = 15;
pub const SHORT_PAUSE_MINUTES: u64 = 5;
pub const SHORT_PAUSE_EVERY: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Activity,
    Pause,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Pause => "pause",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Activity => Self::Pause,
            Self::Pause => Self::Activity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    pub advanced: bool,
    /// Phase in effect after the call.
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDisplay {
    pub minutes_left: u64,
    pub seconds_left: u64,
    pub remaining: Duration,
    pub phase: Phase,
}

/// Activity/pause timer for one card session.
///
/// The cycle never reads a clock itself: every operation takes the current
/// monotonic instant, so callers decide what "now" is.
#[derive(Debug, Clone)]
pub struct PomodoroCycle {
    phase: Phase,
    pause_count: u32,
    phase_end: Instant,
}

impl PomodoroCycle {
    pub fn new(now: Instant) -> Self {
        Self {
            phase: Phase::Activity,
            pause_count: 0,
            phase_end: now + Self::phase_duration(Phase::Activity, 0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pause_count(&self) -> u32 {
        self.pause_count
    }

    pub fn phase_end(&self) -> Instant {
        self.phase_end
    }

    /// Duration of `phase` given the pause count already incremented for it.
    pub fn phase_duration(phase: Phase, pause_count: u32) -> Duration {
        let minutes = match phase {
            Phase::Activity => ACTIVITY_MINUTES,
            Phase::Pause if pause_count % SHORT_PAUSE_EVERY == 0 => SHORT_PAUSE_MINUTES,
            Phase::Pause => LONG_PAUSE_MINUTES,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Advances at most one phase, restarting the new phase from `now`.
    pub fn tick(&mut self, now: Instant) -> TransitionResult {
        if now < self.phase_end {
            return TransitionResult {
                advanced: false,
                phase: self.phase,
            };
        }

        let next = self.phase.next();
        if next == Phase::Pause {
            self.pause_count += 1;
        }
        self.phase = next;
        self.phase_end = now + Self::phase_duration(next, self.pause_count);

        TransitionResult {
            advanced: true,
            phase: next,
        }
    }

    pub fn current_display(&self, now: Instant) -> CycleDisplay {
        let remaining = self.phase_end.saturating_duration_since(now);
        let total_seconds = remaining.as_secs();
        CycleDisplay {
            minutes_left: total_seconds / 60,
            seconds_left: total_seconds % 60,
            remaining,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn minutes(value: u64) -> Duration {
        Duration::from_secs(value * 60)
    }

    #[test]
    fn new_cycle_starts_in_activity_for_twenty_five_minutes() {
        let t0 = Instant::now();
        let cycle = PomodoroCycle::new(t0);
        assert_eq!(cycle.phase(), Phase::Activity);
        assert_eq!(cycle.pause_count(), 0);
        assert_eq!(cycle.phase_end(), t0 + minutes(25));
    }

    #[test]
    fn display_one_minute_before_activity_ends() {
        let t0 = Instant::now();
        let cycle = PomodoroCycle::new(t0);
        let display = cycle.current_display(t0 + minutes(24));
        assert_eq!(display.minutes_left, 1);
        assert_eq!(display.seconds_left, 0);
        assert_eq!(display.phase, Phase::Activity);
    }

    #[test]
    fn tick_after_activity_enters_first_pause() {
        let t0 = Instant::now();
        let mut cycle = PomodoroCycle::new(t0);
        let now = t0 + minutes(25) + Duration::from_secs(1);

        let result = cycle.tick(now);

        assert!(result.advanced);
        assert_eq!(result.phase, Phase::Pause);
        assert_eq!(cycle.pause_count(), 1);
        assert_eq!(cycle.phase_end(), now + minutes(15));
    }

    #[test]
    fn tick_at_exact_phase_end_advances() {
        let t0 = Instant::now();
        let mut cycle = PomodoroCycle::new(t0);
        assert!(!cycle.tick(t0 + minutes(25) - Duration::from_millis(1)).advanced);
        assert!(cycle.tick(t0 + minutes(25)).advanced);
    }

    #[test]
    fn tick_before_phase_end_does_not_mutate() {
        let t0 = Instant::now();
        let mut cycle = PomodoroCycle::new(t0);
        let result = cycle.tick(t0 + minutes(10));
        assert!(!result.advanced);
        assert_eq!(result.phase, Phase::Activity);
        assert_eq!(cycle.phase_end(), t0 + minutes(25));
        assert_eq!(cycle.pause_count(), 0);
    }

    #[test]
    fn pause_returns_to_twenty_five_minute_activity() {
        let t0 = Instant::now();
        let mut cycle = PomodoroCycle::new(t0);
        let pause_start = t0 + minutes(25);
        cycle.tick(pause_start);
        let activity_start = pause_start + minutes(15);

        let result = cycle.tick(activity_start);

        assert!(result.advanced);
        assert_eq!(result.phase, Phase::Activity);
        assert_eq!(cycle.pause_count(), 1);
        assert_eq!(cycle.phase_end(), activity_start + minutes(25));
    }

    #[test]
    fn display_never_goes_negative_after_long_suspension() {
        let t0 = Instant::now();
        let mut cycle = PomodoroCycle::new(t0);
        let late = t0 + minutes(300);
        assert_eq!(cycle.current_display(late).remaining, Duration::ZERO);

        cycle.tick(late);
        let display = cycle.current_display(late);
        assert_eq!(display.phase, Phase::Pause);
        assert_eq!(display.minutes_left, 15);
        assert_eq!(display.seconds_left, 0);
    }

    #[test]
    fn pause_durations_follow_the_short_break_cadence() {
        let mut now = Instant::now();
        let mut cycle = PomodoroCycle::new(now);
        let mut pauses = Vec::new();

        for _ in 0..12 {
            now = cycle.phase_end();
            let result = cycle.tick(now);
            assert!(result.advanced);
            if result.phase == Phase::Pause {
                pauses.push((cycle.phase_end() - now).as_secs() / 60);
            }
        }

        assert_eq!(pauses, vec![15, 15, 5, 15, 15, 5]);
    }

    proptest! {
        #[test]
        fn tick_advances_once_even_past_many_boundaries(
            before_ms in 0u64..(25 * 60 * 1000),
            late_minutes in 0u64..(24 * 60)
        ) {
            let t0 = Instant::now();
            let mut cycle = PomodoroCycle::new(t0);
            let now1 = t0 + Duration::from_millis(before_ms);
            let now2 = cycle.phase_end() + minutes(late_minutes);

            prop_assert!(!cycle.tick(now1).advanced);
            prop_assert!(cycle.tick(now2).advanced);
            prop_assert_eq!(cycle.phase(), Phase::Pause);
            prop_assert_eq!(cycle.pause_count(), 1);
            prop_assert_eq!(cycle.phase_end(), now2 + minutes(15));
        }
    }

    proptest! {
        #[test]
        fn pause_duration_matches_pause_count(pause_count in 1u32..10_000u32) {
            let expected = if pause_count % 3 == 0 { 5 } else { 15 };
            prop_assert_eq!(
                PomodoroCycle::phase_duration(Phase::Pause, pause_count),
                minutes(expected)
            );
        }
    }

    proptest! {
        #[test]
        fn remaining_time_strictly_decreases_within_a_phase(
            first_ms in 0u64..(25 * 60 * 1000 - 1),
            step_ms in 1u64..(25 * 60 * 1000)
        ) {
            let t0 = Instant::now();
            let cycle = PomodoroCycle::new(t0);
            let second_ms = (first_ms + step_ms).min(25 * 60 * 1000 - 1);
            prop_assume!(second_ms > first_ms);

            let earlier = cycle.current_display(t0 + Duration::from_millis(first_ms));
            let later = cycle.current_display(t0 + Duration::from_millis(second_ms));

            prop_assert!(later.remaining < earlier.remaining);
            prop_assert!(later.remaining > Duration::ZERO);
            prop_assert!(later.minutes_left * 60 + later.seconds_left <= earlier.remaining.as_secs());
        }
    }
}
