use serde::{Deserialize, Serialize};

use crate::pointer::{RawMouseEvent, RawTouchEvent};

/// Raw input as the host's UI layer delivers it
///
/// Tagged with the DOM event type, e.g. `{"type": "mousedown", "pageX": 3}`.
/// `getsize` is the application's explicit size request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostEvent {
    MouseDown(RawMouseEvent),
    MouseMove(RawMouseEvent),
    MouseUp(RawMouseEvent),
    TouchStart(RawTouchEvent),
    TouchMove(RawTouchEvent),
    TouchEnd(RawTouchEvent),
    TouchCancel(RawTouchEvent),
    Resize,
    GetSize,
}

/// What the host should do with the native event after dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Propagation {
    pub stop_propagation: bool,
    pub prevent_default: bool,
}

impl Propagation {
    pub const NONE: Self = Self {
        stop_propagation: false,
        prevent_default: false,
    };

    pub const STOP: Self = Self {
        stop_propagation: true,
        prevent_default: false,
    };

    pub const STOP_AND_PREVENT: Self = Self {
        stop_propagation: true,
        prevent_default: true,
    };
}

impl HostEvent {
    /// Mouse events stop bubbling; touch events also suppress the default
    /// action so the browser does not scroll or synthesize mouse events.
    pub fn propagation(&self) -> Propagation {
        match self {
            HostEvent::MouseDown(_) | HostEvent::MouseMove(_) | HostEvent::MouseUp(_) => {
                Propagation::STOP
            }
            HostEvent::TouchStart(_)
            | HostEvent::TouchMove(_)
            | HostEvent::TouchEnd(_)
            | HostEvent::TouchCancel(_) => Propagation::STOP_AND_PREVENT,
            HostEvent::Resize | HostEvent::GetSize => Propagation::NONE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::MouseDown(_) => "mousedown",
            HostEvent::MouseMove(_) => "mousemove",
            HostEvent::MouseUp(_) => "mouseup",
            HostEvent::TouchStart(_) => "touchstart",
            HostEvent::TouchMove(_) => "touchmove",
            HostEvent::TouchEnd(_) => "touchend",
            HostEvent::TouchCancel(_) => "touchcancel",
            HostEvent::Resize => "resize",
            HostEvent::GetSize => "getsize",
        }
    }
}
