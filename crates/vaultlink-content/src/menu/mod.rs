//! Inline menus anchored to classified fields.
//!
//! A menu is built from a list of entries and an anchor element. It never
//! calls back into the page: key presses and clicks return a [`MenuAction`]
//! that the owning context carries out.

mod affordance;
mod position;

use serde::{Deserialize, Serialize};

use vaultlink_protocols::CredentialEntry;

use crate::detector::FieldKind;
use crate::dom::{BoundingBox, NodeId, ViewportInfo};

pub use affordance::{Affordance, AffordanceState, ICON_SIZE};
pub use position::{MenuGeometry, MenuPosition, Placement, compute_position};

/// Menu variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Credentials,
    Cards,
    Identities,
    /// Vault is locked; the only action opens the popup to unlock.
    Locked,
    /// Nothing stored for this page; the only action opens the popup to add one.
    CreateNew,
}

impl MenuKind {
    /// Variants with a single built-in action instead of a data list.
    pub fn is_zero_data(&self) -> bool {
        matches!(self, MenuKind::Locked | MenuKind::CreateNew)
    }

    /// Data variant that serves a field kind.
    pub fn for_field(kind: FieldKind) -> MenuKind {
        match kind {
            FieldKind::Identity(_) => MenuKind::Identities,
            k if k.is_card() => MenuKind::Cards,
            _ => MenuKind::Credentials,
        }
    }

    /// Label of the single row of a zero-data menu.
    pub fn action_label(&self) -> Option<&'static str> {
        match self {
            MenuKind::Locked => Some("Unlock your vault"),
            MenuKind::CreateNew => Some("Add a new item"),
            _ => None,
        }
    }
}

/// One selectable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub entry_id: String,
    pub title: String,
    pub subtitle: Option<String>,
}

impl From<&CredentialEntry> for MenuItem {
    fn from(entry: &CredentialEntry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            title: entry.name.clone(),
            subtitle: entry.subtitle(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// What the owner should do after an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MenuAction {
    /// Fill the chosen entry into the anchor's form.
    Select { entry_id: String },
    /// Ask the background to open the popup.
    OpenPopup,
    /// Menu was dismissed.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    Hidden,
    Visible,
    Destroyed,
}

#[derive(Debug, Clone)]
pub struct Menu {
    kind: MenuKind,
    anchor: NodeId,
    items: Vec<MenuItem>,
    active: usize,
    state: MenuState,
    position: Option<MenuPosition>,
}

impl Menu {
    pub fn new(kind: MenuKind, anchor: NodeId, items: Vec<MenuItem>) -> Self {
        let items = if kind.is_zero_data() { Vec::new() } else { items };
        Self {
            kind,
            anchor,
            items,
            active: 0,
            state: MenuState::Hidden,
            position: None,
        }
    }

    pub fn kind(&self) -> MenuKind {
        self.kind
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == MenuState::Visible
    }

    pub fn position(&self) -> Option<&MenuPosition> {
        self.position.as_ref()
    }

    /// Index of the highlighted row.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Rendered rows: one for zero-data variants.
    pub fn row_count(&self) -> usize {
        if self.kind.is_zero_data() {
            1
        } else {
            self.items.len()
        }
    }

    pub fn show(&mut self, anchor_box: &BoundingBox, viewport: &ViewportInfo, geometry: &MenuGeometry) {
        if self.state == MenuState::Destroyed {
            return;
        }
        self.position = Some(compute_position(
            anchor_box,
            viewport,
            self.row_count(),
            geometry,
        ));
        self.state = MenuState::Visible;
    }

    pub fn hide(&mut self) {
        if self.state == MenuState::Visible {
            self.state = MenuState::Hidden;
        }
    }

    pub fn destroy(&mut self) {
        self.state = MenuState::Destroyed;
        self.position = None;
    }

    /// Keyboard handling. Arrow keys stop at the first and last rows.
    pub fn handle_key(&mut self, key: MenuKey) -> Option<MenuAction> {
        if !self.is_visible() {
            return None;
        }
        let last = self.row_count().saturating_sub(1);
        match key {
            MenuKey::ArrowDown => {
                self.active = (self.active + 1).min(last);
                None
            }
            MenuKey::ArrowUp => {
                self.active = self.active.saturating_sub(1);
                None
            }
            MenuKey::Enter => self.activate(self.active),
            MenuKey::Escape => {
                self.hide();
                Some(MenuAction::Close)
            }
        }
    }

    /// Pointer selection of a row.
    pub fn click(&mut self, index: usize) -> Option<MenuAction> {
        if !self.is_visible() {
            return None;
        }
        self.activate(index)
    }

    fn activate(&mut self, index: usize) -> Option<MenuAction> {
        let action = if self.kind.is_zero_data() {
            MenuAction::OpenPopup
        } else {
            let item = self.items.get(index)?;
            MenuAction::Select {
                entry_id: item.entry_id.clone(),
            }
        };
        self.hide();
        Some(action)
    }
}

#[cfg(test)]
#[path = "menu_tests.rs"]
mod tests;
