use serde::{Deserialize, Serialize};

/// Mouse event as reported by the host
///
/// Field names follow the DOM event so a host can forward events as JSON
/// without reshaping them. Missing coordinates decode as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMouseEvent {
    #[serde(default)]
    pub page_x: f64,
    #[serde(default)]
    pub page_y: f64,
    #[serde(default)]
    pub client_x: f64,
    #[serde(default)]
    pub client_y: f64,
    #[serde(default)]
    pub ctrl_key: bool,
}

impl RawMouseEvent {
    /// Event at a page position with matching client coordinates
    pub fn at_page(page_x: f64, page_y: f64) -> Self {
        Self {
            page_x,
            page_y,
            client_x: page_x,
            client_y: page_y,
            ctrl_key: false,
        }
    }

    pub fn with_client(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }

    pub fn with_ctrl(mut self, ctrl_key: bool) -> Self {
        self.ctrl_key = ctrl_key;
        self
    }
}

/// One touch contact
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTouch {
    /// Platform-assigned identifier, stable for the lifetime of the contact
    ///
    /// Required when decoding: a defaulted id could alias a real contact.
    pub identifier: i64,
    #[serde(default)]
    pub page_x: f64,
    #[serde(default)]
    pub page_y: f64,
    #[serde(default)]
    pub client_x: f64,
    #[serde(default)]
    pub client_y: f64,
}

impl RawTouch {
    pub fn at_page(identifier: i64, page_x: f64, page_y: f64) -> Self {
        Self {
            identifier,
            page_x,
            page_y,
            client_x: page_x,
            client_y: page_y,
        }
    }

    pub fn with_client(mut self, client_x: f64, client_y: f64) -> Self {
        self.client_x = client_x;
        self.client_y = client_y;
        self
    }
}

/// Touch event as reported by the host
///
/// Only the contacts that changed state in this event are carried; contacts
/// that stayed put are not part of the batch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTouchEvent {
    #[serde(default)]
    pub changed_touches: Vec<RawTouch>,
    #[serde(default)]
    pub ctrl_key: bool,
}

impl RawTouchEvent {
    pub fn new(changed_touches: Vec<RawTouch>) -> Self {
        Self {
            changed_touches,
            ctrl_key: false,
        }
    }

    pub fn with_ctrl(mut self, ctrl_key: bool) -> Self {
        self.ctrl_key = ctrl_key;
        self
    }
}
