//! Pointer and resize normalization for message-port based application cores
//!
//! Raw mouse and multi-touch events become uniform [`PointerFrame`]s with
//! element-relative coordinates; window resize bursts become throttled
//! [`Size`] snapshots. Both are delivered through an injected [`PortSink`],
//! one named channel per event kind.

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod pointer;
pub mod ports;
pub mod resize;

pub use config::{ConfigError, PortsConfig};
pub use error::PortsError;
pub use geometry::{ElementLayout, LayoutBox, ReferenceElement, Size};
pub use host::{BridgeHandle, HostEvent, PortsBridge, Propagation};
pub use pointer::{CoordinateSpace, Pointer, PointerFrame, PointerNormalizer};
pub use ports::{ChannelSink, Port, PortMessage, PortSink, SinkError};
pub use resize::{ManualScheduler, ResizeThrottler, Scheduler, ThrottleSettings, TokioScheduler};
