pub mod bootstrap;
pub mod pomodoro_card;
pub mod render_scheduler;
pub mod tick_loop;
