use crate::application::render_scheduler::{CardView, SurfaceProvider};
use crate::domain::pomodoro::{CycleDisplay, Phase, PomodoroCycle};
use crate::infrastructure::activity_log::ActivityLog;
use crate::infrastructure::config::CardConfig;
use crate::infrastructure::error::CardError;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type NowProvider = Arc<dyn Fn() -> Instant + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundId {
    StartActivity,
    StartPause,
}

impl SoundId {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Activity => Self::StartActivity,
            Phase::Pause => Self::StartPause,
        }
    }
}

pub trait SoundEffect: Send {
    fn play(&mut self, sound: SoundId);
}

pub trait WakeSignal: Send {
    fn wake(&mut self);
    fn release_after(&mut self, delay: Duration);
}

pub trait Renderer: Send + 'static {
    type Target;

    fn render(&mut self, target: &mut Self::Target, frame: &CardFrame) -> Result<(), CardError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFrame {
    pub minutes: u64,
    pub seconds: u64,
    pub phase: Phase,
    pub label: String,
    pub color: String,
}

impl CardFrame {
    pub fn minutes_text(&self) -> String {
        format!("{:02}", self.minutes)
    }

    pub fn seconds_text(&self) -> String {
        format!("{:02}", self.seconds)
    }
}

#[derive(Debug, Clone)]
struct PhaseStyle {
    label: String,
    color: String,
}

/// The Pomodoro card: advances the cycle on every tick and paints the
/// countdown through its [`Renderer`].
pub struct PomodoroCard<S, R>
where
    S: SurfaceProvider,
    R: Renderer<Target = S::Target>,
{
    cycle: PomodoroCycle,
    renderer: R,
    sound: Box<dyn SoundEffect>,
    wake: Box<dyn WakeSignal>,
    activity: PhaseStyle,
    pause: PhaseStyle,
    wake_release: Duration,
    card_tag: String,
    log: Arc<ActivityLog>,
    now_provider: NowProvider,
    frame: CardFrame,
    _surface: PhantomData<fn() -> S>,
}

impl<S, R> PomodoroCard<S, R>
where
    S: SurfaceProvider,
    R: Renderer<Target = S::Target>,
{
    pub fn new(
        config: &CardConfig,
        renderer: R,
        sound: Box<dyn SoundEffect>,
        wake: Box<dyn WakeSignal>,
        log: Arc<ActivityLog>,
    ) -> Self {
        let now_provider: NowProvider = Arc::new(|| tokio::time::Instant::now().into_std());
        let activity = PhaseStyle {
            label: config.activity_label.clone(),
            color: config.activity_color.clone(),
        };
        let cycle = PomodoroCycle::new(now_provider());
        let frame = frame_for(&activity, cycle.current_display(now_provider()));

        Self {
            cycle,
            renderer,
            sound,
            wake,
            activity,
            pause: PhaseStyle {
                label: config.pause_label.clone(),
                color: config.pause_color.clone(),
            },
            wake_release: Duration::from_millis(config.wake_release_ms),
            card_tag: config.card_tag.clone(),
            log,
            now_provider,
            frame,
            _surface: PhantomData,
        }
    }

    /// Replaces the clock and restarts the session on it.
    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        let now = now_provider();
        self.cycle = PomodoroCycle::new(now);
        self.frame = frame_for(&self.activity, self.cycle.current_display(now));
        self.now_provider = now_provider;
        self
    }

    pub fn cycle(&self) -> &PomodoroCycle {
        &self.cycle
    }

    pub fn frame(&self) -> &CardFrame {
        &self.frame
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn style(&self, phase: Phase) -> &PhaseStyle {
        match phase {
            Phase::Activity => &self.activity,
            Phase::Pause => &self.pause,
        }
    }

    fn announce(&mut self, phase: Phase, backgrounded: bool) {
        self.sound.play(SoundId::for_phase(phase));
        if !backgrounded {
            self.wake.wake();
            self.wake.release_after(self.wake_release);
        }

        let message = match phase {
            Phase::Activity => format!("Pomodoro: {}", self.activity.label),
            Phase::Pause => format!(
                "Pomodoro: {} (pause #{}, {} min)",
                self.pause.label,
                self.cycle.pause_count(),
                PomodoroCycle::phase_duration(phase, self.cycle.pause_count()).as_secs() / 60
            ),
        };
        self.log.log_info(&self.card_tag, &message);
    }
}

fn frame_for(style: &PhaseStyle, display: CycleDisplay) -> CardFrame {
    CardFrame {
        minutes: display.minutes_left,
        seconds: display.seconds_left,
        phase: display.phase,
        label: style.label.clone(),
        color: style.color.clone(),
    }
}

impl<S, R> CardView for PomodoroCard<S, R>
where
    S: SurfaceProvider,
    R: Renderer<Target = S::Target>,
{
    type Surface = S;

    fn update(&mut self, backgrounded: bool) -> bool {
        let now = (self.now_provider)();
        let transition = self.cycle.tick(now);
        if transition.advanced {
            self.announce(transition.phase, backgrounded);
        }

        let display = self.cycle.current_display(now);
        self.frame = frame_for(self.style(display.phase), display);
        !backgrounded || transition.advanced
    }

    fn draw(&mut self, target: &mut S::Target) -> Result<(), CardError> {
        self.renderer.render(target, &self.frame)
    }
}
