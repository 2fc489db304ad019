//! Inline field icon lifecycle.

use serde::{Deserialize, Serialize};

use crate::detector::FieldKind;
use crate::dom::{BoundingBox, NodeId};

use super::MenuKind;

/// Icon edge length in pixels.
pub const ICON_SIZE: f64 = 16.0;

/// Gap between the icon and the field's right edge.
const ICON_INSET: f64 = 4.0;

/// `Hidden -> Shown -> (MenuOpen <-> Hidden) -> Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordanceState {
    Hidden,
    Shown,
    MenuOpen,
    Destroyed,
}

/// The icon attached to one classified field.
///
/// An icon hosts menus of one kind. Asking for another kind retires it in
/// favour of a successor on the same field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    field: NodeId,
    kind: FieldKind,
    state: AffordanceState,
    menu_kind: Option<MenuKind>,
    generation: u32,
}

impl Affordance {
    pub fn new(field: NodeId, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            state: AffordanceState::Hidden,
            menu_kind: None,
            generation: 0,
        }
    }

    /// Destroy this icon and return a fresh one for the same field.
    pub fn replace(&mut self) -> Affordance {
        self.destroy();
        Affordance {
            generation: self.generation + 1,
            ..Affordance::new(self.field, self.kind)
        }
    }

    pub fn field(&self) -> NodeId {
        self.field
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn state(&self) -> AffordanceState {
        self.state
    }

    /// Kind of menu this icon hosts, once one has been opened.
    pub fn menu_kind(&self) -> Option<MenuKind> {
        self.menu_kind
    }

    /// How many icons preceded this one on the field.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether opening a `kind` menu needs a new icon.
    pub fn needs_replacement(&self, kind: MenuKind) -> bool {
        self.menu_kind.is_some_and(|current| current != kind)
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == AffordanceState::Destroyed
    }

    /// Field gained focus.
    pub fn show(&mut self) -> bool {
        self.transition(AffordanceState::Hidden, AffordanceState::Shown)
    }

    /// Field lost focus without a menu open.
    pub fn hide(&mut self) -> bool {
        self.transition(AffordanceState::Shown, AffordanceState::Hidden)
    }

    pub fn open_menu(&mut self, kind: MenuKind) -> bool {
        match self.state {
            AffordanceState::Hidden | AffordanceState::Shown => {
                self.state = AffordanceState::MenuOpen;
                self.menu_kind = Some(kind);
                true
            }
            _ => false,
        }
    }

    /// Menu closed by an outside click, Escape or a selection.
    pub fn close_menu(&mut self) -> bool {
        self.transition(AffordanceState::MenuOpen, AffordanceState::Hidden)
    }

    pub fn destroy(&mut self) {
        self.state = AffordanceState::Destroyed;
    }

    fn transition(&mut self, from: AffordanceState, to: AffordanceState) -> bool {
        if self.state == from {
            self.state = to;
            true
        } else {
            false
        }
    }

    /// Where the icon sits: vertically centered at the field's right edge.
    pub fn icon_box(field_box: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            field_box.right() - ICON_SIZE - ICON_INSET,
            field_box.y + (field_box.height - ICON_SIZE) / 2.0,
            ICON_SIZE,
            ICON_SIZE,
        )
    }
}
