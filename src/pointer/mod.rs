//! Pointer input normalization
//!
//! Converts raw host mouse and touch events into uniform [`PointerFrame`]s:
//!
//! 1. [`raw_event`] - Event shapes as the host reports them
//! 2. [`normalizer`] - Coordinate correction and multi-touch aggregation
//!
//! ```text
//! RawMouseEvent ──┐
//!                 ├──► PointerNormalizer ──► PointerFrame
//! RawTouchEvent ──┘      (+ ReferenceElement offset)
//! ```

pub mod normalizer;
pub mod raw_event;

pub use normalizer::{CoordinateSpace, Pointer, PointerFrame, PointerNormalizer, MOUSE_POINTER_ID};
pub use raw_event::{RawMouseEvent, RawTouch, RawTouchEvent};
