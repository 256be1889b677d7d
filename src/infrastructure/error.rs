use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Surface unavailable: {0}")]
    Surface(String),
    #[error("Render failed: {0}")]
    Render(String),
    #[error("render scheduler is no longer running")]
    SchedulerClosed,
}
