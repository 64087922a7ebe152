use thiserror::Error;

/// Errors when setting up a timer backend
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No tokio runtime is reachable from the calling thread
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}
