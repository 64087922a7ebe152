//! Reference element geometry
//!
//! The reference element is owned by the host. Pointer normalization reads its
//! layout offset and the resize throttler reads its content box size; neither
//! ever mutates it. A detached element reports no geometry, which every reader
//! in this crate resolves to zero.

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, trace};

/// Rendered content box size of the reference element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Read-only view of a host UI node
///
/// Both reads return `None` while the element is not part of the layout tree.
pub trait ReferenceElement: Send + Sync {
    /// Layout offset of the element (`offsetLeft`, `offsetTop`)
    fn offset(&self) -> Option<(f64, f64)>;

    /// Content box size (`clientWidth`, `clientHeight`)
    fn client_size(&self) -> Option<Size>;
}

/// Offset of the element, `(0, 0)` when detached
pub fn read_offset(element: &dyn ReferenceElement) -> (f64, f64) {
    match element.offset() {
        Some(offset) => offset,
        None => {
            debug!("Reference element has no layout, using zero offset");
            (0.0, 0.0)
        }
    }
}

/// Size of the element, zero when detached
pub fn read_size(element: &dyn ReferenceElement) -> Size {
    match element.client_size() {
        Some(size) => size,
        None => {
            debug!("Reference element has no layout, using zero size");
            Size::default()
        }
    }
}

/// Geometry snapshot the host writes into a [`LayoutBox`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementLayout {
    #[serde(default)]
    pub offset_left: f64,
    #[serde(default)]
    pub offset_top: f64,
    #[serde(default)]
    pub client_width: u32,
    #[serde(default)]
    pub client_height: u32,
}

/// Shared element whose geometry is pushed by the host on every layout pass
///
/// Hosts that cannot hand out their native node across threads keep one of
/// these in an `Arc` and update it whenever layout changes.
#[derive(Debug, Default)]
pub struct LayoutBox {
    layout: RwLock<Option<ElementLayout>>,
}

impl LayoutBox {
    /// Element that is laid out with the given geometry
    pub fn new(layout: ElementLayout) -> Self {
        Self {
            layout: RwLock::new(Some(layout)),
        }
    }

    /// Element not yet attached to the layout tree
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn set_layout(&self, layout: ElementLayout) {
        trace!("Layout updated: {:?}", layout);
        *self.layout.write().unwrap_or_else(PoisonError::into_inner) = Some(layout);
    }

    pub fn set_size(&self, size: Size) {
        let mut guard = self.layout.write().unwrap_or_else(PoisonError::into_inner);
        let mut layout = (*guard).unwrap_or_default();
        layout.client_width = size.width;
        layout.client_height = size.height;
        *guard = Some(layout);
    }

    /// Remove the element from the layout tree
    pub fn detach(&self) {
        debug!("Reference element detached");
        *self.layout.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn layout(&self) -> Option<ElementLayout> {
        *self.layout.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReferenceElement for LayoutBox {
    fn offset(&self) -> Option<(f64, f64)> {
        self.layout()
            .map(|layout| (layout.offset_left, layout.offset_top))
    }

    fn client_size(&self) -> Option<Size> {
        self.layout()
            .map(|layout| Size::new(layout.client_width, layout.client_height))
    }
}
