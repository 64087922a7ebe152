use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::SinkError;
use crate::resize::SchedulerError;

/// Errors surfaced by the host bridge
#[derive(Debug, Error)]
pub enum PortsError {
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The bridge inbox is closed
    #[error("Channel error: {0}")]
    Channel(String),

    /// The bridge task ended abnormally
    #[error("Task error: {0}")]
    Task(String),
}
