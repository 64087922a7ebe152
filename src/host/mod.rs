//! Host adapter layer
//!
//! Thin glue between the host's UI event source and the pure normalization
//! core. The host registers its listeners, wraps each native event in a
//! [`HostEvent`] and applies the returned [`Propagation`] to the native event.

pub mod bridge;
pub mod event;

pub use bridge::{BridgeHandle, BridgeStats, PortsBridge};
pub use event::{HostEvent, Propagation};
