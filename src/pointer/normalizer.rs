use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::geometry::{read_offset, ReferenceElement};
use crate::pointer::raw_event::{RawMouseEvent, RawTouch, RawTouchEvent};

/// Identifier used for the single mouse pointer
pub const MOUSE_POINTER_ID: &str = "mouse";

/// A single point of contact in element-relative coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: String,
    pub position: (f64, f64),
}

impl Pointer {
    pub fn new(id: impl Into<String>, position: (f64, f64)) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "pointer ids are never empty");
        Self { id, position }
    }
}

/// Every pointer carried by one input event, in the order the event listed them
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerFrame {
    pub pointers: Vec<Pointer>,
    pub ctrl_down: bool,
}

/// Which host coordinates a normalizer reads
///
/// `Page` subtracts the reference element's layout offset from page
/// coordinates, so positions stay correct when the element is nested or the
/// page scrolls between dispatch and the offset read. `Client` forwards
/// viewport coordinates as-is and expects the host to have placed the element
/// at the viewport origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSpace {
    #[default]
    Page,
    Client,
}

/// Turns raw host pointer events into [`PointerFrame`]s
///
/// Pure: no state is kept between events and the reference element is only
/// read. One normalizer applies a single [`CoordinateSpace`] to both mouse and
/// touch input.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerNormalizer {
    space: CoordinateSpace,
}

impl PointerNormalizer {
    pub fn new(space: CoordinateSpace) -> Self {
        debug!("Creating pointer normalizer in {:?} space", space);
        Self { space }
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Frame holding exactly one pointer with id `"mouse"`
    pub fn normalize_mouse(
        &self,
        event: &RawMouseEvent,
        element: &dyn ReferenceElement,
    ) -> PointerFrame {
        let position = self.correct(
            (event.page_x, event.page_y),
            (event.client_x, event.client_y),
            element,
        );
        trace!("Mouse at {:?} (ctrl: {})", position, event.ctrl_key);

        PointerFrame {
            pointers: vec![Pointer::new(MOUSE_POINTER_ID, position)],
            ctrl_down: event.ctrl_key,
        }
    }

    /// Frame holding one pointer per changed touch, in event order
    pub fn normalize_touch_batch(
        &self,
        event: &RawTouchEvent,
        element: &dyn ReferenceElement,
    ) -> PointerFrame {
        // Offset is read once per event so every contact in the batch is
        // corrected against the same layout.
        let offset = match self.space {
            CoordinateSpace::Page => read_offset(element),
            CoordinateSpace::Client => (0.0, 0.0),
        };

        let pointers: Vec<Pointer> = event
            .changed_touches
            .iter()
            .map(|touch| self.touch_pointer(touch, offset))
            .collect();
        trace!(
            "Touch batch with {} changed contacts (ctrl: {})",
            pointers.len(),
            event.ctrl_key
        );

        PointerFrame {
            pointers,
            ctrl_down: event.ctrl_key,
        }
    }

    fn touch_pointer(&self, touch: &RawTouch, offset: (f64, f64)) -> Pointer {
        let raw = match self.space {
            CoordinateSpace::Page => (touch.page_x, touch.page_y),
            CoordinateSpace::Client => (touch.client_x, touch.client_y),
        };
        let position = check_finite((raw.0 - offset.0, raw.1 - offset.1));
        Pointer::new(touch.identifier.to_string(), position)
    }

    fn correct(
        &self,
        page: (f64, f64),
        client: (f64, f64),
        element: &dyn ReferenceElement,
    ) -> (f64, f64) {
        let position = match self.space {
            CoordinateSpace::Page => {
                let (left, top) = read_offset(element);
                (page.0 - left, page.1 - top)
            }
            CoordinateSpace::Client => client,
        };
        check_finite(position)
    }
}

fn check_finite(position: (f64, f64)) -> (f64, f64) {
    if !position.0.is_finite() || !position.1.is_finite() {
        warn!("Host delivered non-finite pointer position {:?}", position);
    }
    position
}
