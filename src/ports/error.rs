//! Error definitions for port delivery

use thiserror::Error;

use crate::ports::Port;

/// Delivery failures of a [`PortSink`](crate::ports::PortSink)
#[derive(Debug, Error)]
pub enum SinkError {
    /// The application core stopped listening
    #[error("Port channel closed: {0}")]
    ChannelClosed(Port),

    /// The application core is not keeping up with the event rate
    #[error("Port channel full: {0}")]
    ChannelFull(Port),
}
