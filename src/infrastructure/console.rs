use crate::application::pomodoro_card::{CardFrame, Renderer, SoundEffect, SoundId, WakeSignal};
use crate::application::render_scheduler::SurfaceProvider;
use crate::infrastructure::activity_log::ActivityLog;
use crate::infrastructure::error::CardError;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

/// Terminal line used as the card's drawing surface. Each frame is composed
/// into a string and posted to stdout when the target is released.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl SurfaceProvider for ConsoleSurface {
    type Target = String;

    fn acquire_draw_target(&mut self) -> Result<String, CardError> {
        Ok(String::new())
    }

    fn release(&mut self, target: String) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r{target}\x1b[K");
        let _ = stdout.flush();
    }
}

#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    type Target = String;

    fn render(&mut self, target: &mut String, frame: &CardFrame) -> Result<(), CardError> {
        write!(
            target,
            "{} {}:{}",
            frame.label,
            frame.minutes_text(),
            frame.seconds_text()
        )
        .map_err(|error| CardError::Render(error.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct TerminalBell;

impl SoundEffect for TerminalBell {
    fn play(&mut self, _sound: SoundId) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Stands in for a display wake lock: records the wake and its release.
pub struct LoggedWakeSignal {
    log: Arc<ActivityLog>,
    source: String,
}

impl LoggedWakeSignal {
    pub fn new(log: Arc<ActivityLog>, card_tag: &str) -> Self {
        Self {
            log,
            source: format!("{card_tag}-wake"),
        }
    }
}

impl WakeSignal for LoggedWakeSignal {
    fn wake(&mut self) {
        self.log.log_info(&self.source, "display woken");
    }

    fn release_after(&mut self, delay: Duration) {
        let log = Arc::clone(&self.log);
        let source = self.source.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    log.log_info(&source, "wake lock released");
                });
            }
            Err(_) => log.log_info(&source, "wake lock released"),
        }
    }
}
