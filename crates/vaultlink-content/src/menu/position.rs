//! Menu placement relative to its anchor.

use serde::{Deserialize, Serialize};

use vaultlink_config::MenuConfig;

use crate::dom::{BoundingBox, ViewportInfo};

/// Menu dimensions and the margin kept from the viewport edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuGeometry {
    pub width: f64,
    pub item_height: f64,
    pub margin: f64,
    pub max_visible_items: usize,
}

impl Default for MenuGeometry {
    fn default() -> Self {
        Self::from(&MenuConfig::default())
    }
}

impl From<&MenuConfig> for MenuGeometry {
    fn from(config: &MenuConfig) -> Self {
        Self {
            width: config.width,
            item_height: config.item_height,
            margin: config.viewport_margin,
            max_visible_items: config.max_visible_items,
        }
    }
}

/// Which side of the anchor the menu opened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MenuPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub placement: Placement,
}

/// Place a menu of `rows` rows below `anchor`, flipping above when it would
/// run past the bottom of the viewport, and clamping it horizontally.
pub fn compute_position(
    anchor: &BoundingBox,
    viewport: &ViewportInfo,
    rows: usize,
    geometry: &MenuGeometry,
) -> MenuPosition {
    let visible_rows = rows.clamp(1, geometry.max_visible_items.max(1));
    let height = visible_rows as f64 * geometry.item_height;
    let width = geometry.width.min(viewport.width - 2.0 * geometry.margin).max(0.0);

    let below = anchor.bottom();
    let (y, placement) = if below + height > viewport.height - geometry.margin {
        ((anchor.y - height).max(geometry.margin), Placement::Above)
    } else {
        (below, Placement::Below)
    };

    let max_x = (viewport.width - width - geometry.margin).max(geometry.margin);
    let x = anchor.x.clamp(geometry.margin, max_x);

    MenuPosition {
        x,
        y,
        width,
        height,
        placement,
    }
}
