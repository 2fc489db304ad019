//! Content-side configuration types (autofill, save prompt, menu, badge).

use serde::{Deserialize, Serialize};

use super::default_true;

/// Autofill behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutofillConfig {
    /// Inject inline icons on detected fields.
    #[serde(default = "default_true")]
    pub show_icons: bool,

    /// Allow keyboard cycling through multiple matches.
    #[serde(default = "default_true")]
    pub cycle_enabled: bool,

    /// Fetch and fill a one-time code after a login fill.
    #[serde(default = "default_true")]
    pub totp_autofill: bool,
}

impl Default for AutofillConfig {
    fn default() -> Self {
        Self {
            show_icons: true,
            cycle_enabled: true,
            totp_autofill: true,
        }
    }
}

/// Save/update prompt behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePromptConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The prompt closes itself after this long.
    #[serde(default = "default_dismiss_after_seconds")]
    pub dismiss_after_seconds: u64,

    /// Wait after a same-page submit before evaluating the capture.
    #[serde(default = "default_same_page_delay_ms")]
    pub same_page_delay_ms: u64,

    /// Pending captures older than this are dropped without prompting.
    #[serde(default = "default_max_pending_age_seconds")]
    pub max_pending_age_seconds: u64,
}

impl Default for SavePromptConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dismiss_after_seconds: default_dismiss_after_seconds(),
            same_page_delay_ms: default_same_page_delay_ms(),
            max_pending_age_seconds: default_max_pending_age_seconds(),
        }
    }
}

fn default_dismiss_after_seconds() -> u64 {
    30
}

fn default_same_page_delay_ms() -> u64 {
    100
}

fn default_max_pending_age_seconds() -> u64 {
    300
}

/// Inline menu geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Minimum distance kept between a menu and the viewport edges.
    #[serde(default = "default_viewport_margin")]
    pub viewport_margin: f64,

    #[serde(default = "default_item_height")]
    pub item_height: f64,

    #[serde(default = "default_menu_width")]
    pub width: f64,

    /// Rows shown before the list scrolls.
    #[serde(default = "default_max_visible_items")]
    pub max_visible_items: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            viewport_margin: default_viewport_margin(),
            item_height: default_item_height(),
            width: default_menu_width(),
            max_visible_items: default_max_visible_items(),
        }
    }
}

fn default_viewport_margin() -> f64 {
    8.0
}

fn default_item_height() -> f64 {
    40.0
}

fn default_menu_width() -> f64 {
    280.0
}

fn default_max_visible_items() -> usize {
    6
}

/// Toolbar badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeConfig {
    #[serde(default = "default_badge_color")]
    pub color: String,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            color: default_badge_color(),
        }
    }
}

fn default_badge_color() -> String {
    "#175DDC".to_string()
}
