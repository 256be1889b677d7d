pub mod application;
pub mod domain;
pub mod infrastructure;

use application::bootstrap::bootstrap_workspace;
use application::pomodoro_card::PomodoroCard;
use application::render_scheduler::RenderScheduler;
use infrastructure::activity_log::ActivityLog;
use infrastructure::config::CardConfig;
use infrastructure::console::{ConsoleSurface, LoggedWakeSignal, TerminalBell, TextRenderer};
use infrastructure::error::CardError;
use std::sync::Arc;

pub type ConsoleCard = PomodoroCard<ConsoleSurface, TextRenderer>;

pub fn console_card(config: &CardConfig, log: Arc<ActivityLog>) -> ConsoleCard {
    PomodoroCard::new(
        config,
        TextRenderer,
        Box::new(TerminalBell),
        Box::new(LoggedWakeSignal::new(Arc::clone(&log), &config.card_tag)),
        log,
    )
}

/// Runs the card in the terminal until Ctrl-C.
pub async fn run() -> Result<(), CardError> {
    let workspace_root = std::env::current_dir()?;
    let bootstrap = bootstrap_workspace(&workspace_root)?;
    let config = bootstrap.config;
    let log = Arc::new(ActivityLog::in_dir(&bootstrap.logs_dir));
    log.log_info(
        &config.card_tag,
        &format!("card attached in {}", bootstrap.workspace_root.display()),
    );

    let scheduler = RenderScheduler::spawn(
        console_card(&config, Arc::clone(&log)),
        &config.card_tag,
        Arc::clone(&log),
    );
    scheduler.configure(config.foreground_interval_ms, config.background_interval_ms)?;
    scheduler.on_surface_available(ConsoleSurface)?;

    tokio::signal::ctrl_c().await?;

    scheduler.on_surface_unavailable()?;
    scheduler.stop()?;
    scheduler.shutdown().await?;
    println!();
    log.log_info(&config.card_tag, "card disposed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pomodoro_card::{SoundEffect, SoundId};
    use crate::application::render_scheduler::SurfaceProvider;
    use crate::domain::pomodoro::Phase;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Silent;

    impl SoundEffect for Silent {
        fn play(&mut self, _sound: SoundId) {}
    }

    #[derive(Default, Clone)]
    struct CapturingSurface {
        frames: Arc<Mutex<Vec<String>>>,
    }

    impl SurfaceProvider for CapturingSurface {
        type Target = String;

        fn acquire_draw_target(&mut self) -> Result<String, CardError> {
            Ok(String::new())
        }

        fn release(&mut self, target: String) {
            self.frames.lock().expect("frames lock").push(target);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_card_enters_pause_after_activity() {
        let config = CardConfig::default();
        let log = Arc::new(ActivityLog::in_memory());
        let card: PomodoroCard<CapturingSurface, TextRenderer> = PomodoroCard::new(
            &config,
            TextRenderer,
            Box::new(Silent),
            Box::new(LoggedWakeSignal::new(Arc::clone(&log), &config.card_tag)),
            Arc::clone(&log),
        );
        let surface = CapturingSurface::default();
        let scheduler = RenderScheduler::spawn(card, &config.card_tag, Arc::clone(&log));
        scheduler.configure(1000, 1000).expect("configure");
        scheduler
            .on_surface_available(surface.clone())
            .expect("surface available");

        tokio::time::sleep(Duration::from_secs(25 * 60 + 1)).await;
        let card = scheduler.shutdown().await.expect("shutdown");

        assert_eq!(card.cycle().phase(), Phase::Pause);
        assert_eq!(card.cycle().pause_count(), 1);
        let frames = surface.frames.lock().expect("frames lock").clone();
        assert_eq!(frames.first().map(String::as_str), Some("In activity 25:00"));
        assert!(frames.last().is_some_and(|frame| frame.starts_with("In pause 1")));
        let entries = log.entries();
        assert!(entries.iter().any(|entry| entry.message.contains("pause #1")));
        assert!(entries.iter().any(|entry| entry.message == "display woken"));
    }
}
