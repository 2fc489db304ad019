//! Shared DOM types: viewport, bounding box, and element attributes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Viewport information for positioning calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportInfo {
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
}

impl Default for ViewportInfo {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Bounding box for an element, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this bounding box.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Attributes the detectors look at.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementAttributes {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Type attribute. `None` on an input means `text`.
    pub r#type: Option<String>,
    pub autocomplete: Option<String>,
    /// Visible hint, consulted when `name`/`id` say nothing.
    pub placeholder: Option<String>,
    pub aria_label: Option<String>,
    /// `data-*` attributes, keyed by full attribute name.
    #[serde(default)]
    pub data: HashMap<String, String>,
}
