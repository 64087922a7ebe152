//! Outbound message ports
//!
//! The application core listens on one named channel per event kind. The
//! [`PortSink`] capability is injected into every component that emits, so
//! nothing in this crate reaches for an ambient message bus.

pub mod error;

pub use error::SinkError;

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::geometry::Size;
use crate::pointer::PointerFrame;

/// Named inbound channels of the application core
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Port {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    SizeChanges,
}

impl Port {
    pub fn name(&self) -> &'static str {
        match self {
            Port::MouseDown => "mouseDown",
            Port::MouseMove => "mouseMove",
            Port::MouseUp => "mouseUp",
            Port::TouchStart => "touchStart",
            Port::TouchMove => "touchMove",
            Port::TouchEnd => "touchEnd",
            Port::TouchCancel => "touchCancel",
            Port::SizeChanges => "sizeChanges",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A payload addressed to one port
///
/// Serializes as `{"port": "<name>", "payload": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "port", content = "payload", rename_all = "camelCase")]
pub enum PortMessage {
    MouseDown(PointerFrame),
    MouseMove(PointerFrame),
    MouseUp(PointerFrame),
    TouchStart(PointerFrame),
    TouchMove(PointerFrame),
    TouchEnd(PointerFrame),
    TouchCancel(PointerFrame),
    SizeChanges(Size),
}

impl PortMessage {
    pub fn port(&self) -> Port {
        match self {
            PortMessage::MouseDown(_) => Port::MouseDown,
            PortMessage::MouseMove(_) => Port::MouseMove,
            PortMessage::MouseUp(_) => Port::MouseUp,
            PortMessage::TouchStart(_) => Port::TouchStart,
            PortMessage::TouchMove(_) => Port::TouchMove,
            PortMessage::TouchEnd(_) => Port::TouchEnd,
            PortMessage::TouchCancel(_) => Port::TouchCancel,
            PortMessage::SizeChanges(_) => Port::SizeChanges,
        }
    }

    pub fn frame(&self) -> Option<&PointerFrame> {
        match self {
            PortMessage::MouseDown(frame)
            | PortMessage::MouseMove(frame)
            | PortMessage::MouseUp(frame)
            | PortMessage::TouchStart(frame)
            | PortMessage::TouchMove(frame)
            | PortMessage::TouchEnd(frame)
            | PortMessage::TouchCancel(frame) => Some(frame),
            PortMessage::SizeChanges(_) => None,
        }
    }

    pub fn size(&self) -> Option<Size> {
        match self {
            PortMessage::SizeChanges(size) => Some(*size),
            _ => None,
        }
    }
}

/// Capability to deliver messages to the application core
///
/// Implementors provide [`PortSink::send`]; the per-channel helpers route
/// through it.
pub trait PortSink: Send + Sync {
    fn send(&self, message: PortMessage) -> Result<(), SinkError>;

    fn mouse_down(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::MouseDown(frame))
    }

    fn mouse_move(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::MouseMove(frame))
    }

    fn mouse_up(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::MouseUp(frame))
    }

    fn touch_start(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::TouchStart(frame))
    }

    fn touch_move(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::TouchMove(frame))
    }

    fn touch_end(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::TouchEnd(frame))
    }

    fn touch_cancel(&self, frame: PointerFrame) -> Result<(), SinkError> {
        self.send(PortMessage::TouchCancel(frame))
    }

    fn size_changes(&self, size: Size) -> Result<(), SinkError> {
        self.send(PortMessage::SizeChanges(size))
    }
}

/// Sink backed by a bounded tokio mpsc channel
///
/// Never waits: a full buffer is reported as [`SinkError::ChannelFull`] so
/// callers on the event loop return immediately. Failures are returned, not
/// logged; the caller logs them once.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: mpsc::Sender<PortMessage>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<PortMessage>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end the application core reads from
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<PortMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        debug!("Created port channel with buffer capacity {}", capacity);
        (Self::new(sender), receiver)
    }
}

impl PortSink for ChannelSink {
    fn send(&self, message: PortMessage) -> Result<(), SinkError> {
        let port = message.port();
        match self.sender.try_send(message) {
            Ok(()) => {
                trace!("Message sent to {}", port);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(_)) => Err(SinkError::ChannelFull(port)),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::ChannelClosed(port)),
        }
    }
}
