use crate::application::tick_loop::TickLoop;
use crate::infrastructure::activity_log::ActivityLog;
use crate::infrastructure::error::CardError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant as TokioInstant};

/// A drawable surface owned by the scheduler while it is attached.
pub trait SurfaceProvider: Send + 'static {
    type Target;

    fn acquire_draw_target(&mut self) -> Result<Self::Target, CardError>;
    fn release(&mut self, target: Self::Target);
}

/// The update-and-draw callback driven by [`RenderScheduler`].
pub trait CardView: Send + 'static {
    type Surface: SurfaceProvider;

    /// Refreshes view state; returns `true` when a redraw is needed.
    fn update(&mut self, backgrounded: bool) -> bool;

    fn draw(
        &mut self,
        target: &mut <Self::Surface as SurfaceProvider>::Target,
    ) -> Result<(), CardError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub running: bool,
    pub surface_ready: bool,
    pub backgrounded: bool,
    pub next_tick_in: Option<Duration>,
    pub ticks: u64,
}

enum Command<S> {
    Configure {
        foreground_interval_ms: i64,
        background_interval_ms: i64,
    },
    SurfaceAvailable(S),
    SurfaceUnavailable,
    VisibilityChanged(bool),
    Stop,
    Status(oneshot::Sender<SchedulerStatus>),
}

fn now() -> Instant {
    TokioInstant::now().into_std()
}

/// Handle to the single worker task that runs the tick loop.
///
/// Every lifecycle call is queued to the worker, which also executes ticks,
/// so ticks and lifecycle changes never interleave. Dropping the handle ends
/// the worker and releases the surface.
pub struct RenderScheduler<V: CardView> {
    commands: mpsc::UnboundedSender<Command<V::Surface>>,
    worker: JoinHandle<V>,
}

impl<V: CardView> RenderScheduler<V> {
    /// Spawns the worker on the current tokio runtime. The loop starts
    /// disabled until [`configure`](Self::configure) is called.
    pub fn spawn(view: V, card_tag: &str, log: Arc<ActivityLog>) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = Worker {
            view,
            surface: None,
            tick_loop: TickLoop::new(),
            log,
            source: format!("{card_tag}-renderer"),
            ticks: 0,
        };
        Self {
            commands,
            worker: tokio::spawn(worker.run(receiver)),
        }
    }

    pub fn configure(
        &self,
        foreground_interval_ms: i64,
        background_interval_ms: i64,
    ) -> Result<(), CardError> {
        self.send(Command::Configure {
            foreground_interval_ms,
            background_interval_ms,
        })
    }

    pub fn on_surface_available(&self, surface: V::Surface) -> Result<(), CardError> {
        self.send(Command::SurfaceAvailable(surface))
    }

    pub fn on_surface_unavailable(&self) -> Result<(), CardError> {
        self.send(Command::SurfaceUnavailable)
    }

    pub fn on_visibility_changed(&self, backgrounded: bool) -> Result<(), CardError> {
        self.send(Command::VisibilityChanged(backgrounded))
    }

    pub fn stop(&self) -> Result<(), CardError> {
        self.send(Command::Stop)
    }

    pub async fn status(&self) -> Result<SchedulerStatus, CardError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Status(reply))?;
        response.await.map_err(|_| CardError::SchedulerClosed)
    }

    /// Stops the loop, releases the surface and hands the view back.
    pub async fn shutdown(self) -> Result<V, CardError> {
        let Self { commands, worker } = self;
        drop(commands);
        worker.await.map_err(|_| CardError::SchedulerClosed)
    }

    fn send(&self, command: Command<V::Surface>) -> Result<(), CardError> {
        self.commands
            .send(command)
            .map_err(|_| CardError::SchedulerClosed)
    }
}

struct Worker<V: CardView> {
    view: V,
    surface: Option<V::Surface>,
    tick_loop: TickLoop,
    log: Arc<ActivityLog>,
    source: String,
    ticks: u64,
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(TokioInstant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

impl<V: CardView> Worker<V> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command<V::Surface>>) -> V {
        loop {
            let deadline = self.tick_loop.next_tick();
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = wait_until(deadline) => self.tick(),
            }
        }

        if self.tick_loop.is_running() {
            self.log.log_info(&self.source, "render loop stopped on teardown");
        }
        self.tick_loop.stop();
        self.surface = None;
        self.view
    }

    fn handle(&mut self, command: Command<V::Surface>) {
        let was_running = self.tick_loop.is_running();
        match command {
            Command::Configure {
                foreground_interval_ms,
                background_interval_ms,
            } => {
                self.tick_loop
                    .configure(foreground_interval_ms, background_interval_ms, now());
                if !self.tick_loop.is_enabled() {
                    self.log.log_info(
                        &self.source,
                        &format!("interval updates disabled (foreground {foreground_interval_ms}ms)"),
                    );
                }
            }
            Command::SurfaceAvailable(surface) => {
                self.surface = Some(surface);
                self.tick_loop.on_surface_available(now());
            }
            Command::SurfaceUnavailable => {
                self.surface = None;
                self.tick_loop.on_surface_unavailable();
            }
            Command::VisibilityChanged(backgrounded) => {
                self.tick_loop.on_visibility_changed(backgrounded, now());
            }
            Command::Stop => self.tick_loop.stop(),
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }

        match (was_running, self.tick_loop.is_running()) {
            (false, true) => self.log.log_info(&self.source, "render loop started"),
            (true, false) => self.log.log_info(&self.source, "render loop stopped"),
            _ => {}
        }
    }

    fn tick(&mut self) {
        let started = now();
        let Some(backgrounded) = self.tick_loop.begin_tick(started) else {
            return;
        };
        self.ticks += 1;

        if self.view.update(backgrounded) {
            self.draw();
        }
        self.tick_loop.finish_tick(started);
        if !self.tick_loop.is_running() {
            self.log.log_info(&self.source, "render loop stopped");
        }
    }

    fn draw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let mut target = match surface.acquire_draw_target() {
            Ok(target) => target,
            Err(error) => {
                self.log.log_error(
                    &self.source,
                    &format!("unable to acquire draw target: {error}"),
                );
                return;
            }
        };
        if let Err(error) = self.view.draw(&mut target) {
            self.log.log_error(&self.source, &format!("draw failed: {error}"));
        }
        surface.release(target);
    }

    fn status(&self) -> SchedulerStatus {
        let now = now();
        SchedulerStatus {
            running: self.tick_loop.is_running(),
            surface_ready: self.tick_loop.surface_ready(),
            backgrounded: self.tick_loop.backgrounded(),
            next_tick_in: self
                .tick_loop
                .next_tick()
                .map(|deadline| deadline.saturating_duration_since(now)),
            ticks: self.ticks,
        }
    }
}
