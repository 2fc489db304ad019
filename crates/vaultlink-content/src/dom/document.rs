//! Arena-backed page model the content runtime operates on.
//!
//! The host mirrors the relevant part of the live page into a [`Document`]:
//! inputs, forms and buttons with their attributes and geometry. Detection,
//! fill and menu placement all read and write through it, and every synthetic
//! event the runtime dispatches is recorded so the host can replay it.

use serde::{Deserialize, Serialize};

use super::dom_types::{BoundingBox, ElementAttributes, ViewportInfo};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Synthetic events the runtime dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEventKind {
    Input,
    Change,
    /// Transient background flash acknowledging a fill.
    Highlight,
}

/// A recorded dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: NodeId,
    pub kind: DomEventKind,
    pub bubbles: bool,
}

/// An element of the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Tag name (lowercase).
    pub tag_name: String,
    pub attributes: ElementAttributes,
    /// Current value for form controls.
    pub value: String,
    pub disabled: bool,
    pub is_visible: bool,
    /// Bounding box in viewport coordinates.
    pub bounding_box: BoundingBox,
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    connected: bool,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes: ElementAttributes::default(),
            value: String::new(),
            disabled: false,
            is_visible: true,
            bounding_box: BoundingBox::default(),
            parent_id: None,
            children: Vec::new(),
            connected: false,
        }
    }

    pub fn input(input_type: &str) -> Self {
        let mut element = Self::new("input");
        element.attributes.r#type = Some(input_type.to_string());
        element
    }

    pub fn form() -> Self {
        Self::new("form")
    }

    pub fn button(button_type: &str) -> Self {
        let mut element = Self::new("button");
        element.attributes.r#type = Some(button_type.to_string());
        element
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.attributes.name = Some(name.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.attributes.id = Some(id.to_string());
        self
    }

    pub fn with_autocomplete(mut self, autocomplete: &str) -> Self {
        self.attributes.autocomplete = Some(autocomplete.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.attributes.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_aria_label(mut self, label: &str) -> Self {
        self.attributes.aria_label = Some(label.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn at(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.bounding_box = BoundingBox::new(x, y, width, height);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    /// Whether this is a form control the detectors consider.
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "select" | "textarea")
    }

    /// Lowercased input type, defaulting to `text`.
    pub fn input_type(&self) -> String {
        self.attributes
            .r#type
            .as_deref()
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.attributes.data.get(key).map(String::as_str)
    }

    /// Whether a click on this element submits its form.
    pub fn is_submit_control(&self) -> bool {
        match self.tag_name.as_str() {
            "button" => self.input_type() == "submit" || self.attributes.r#type.is_none(),
            "input" => matches!(self.input_type().as_str(), "submit" | "image"),
            _ => false,
        }
    }
}

/// The page as seen by one content context.
#[derive(Debug, Clone)]
pub struct Document {
    url: String,
    top_level: bool,
    viewport: ViewportInfo,
    nodes: Vec<Element>,
    events: Vec<DomEvent>,
}

impl Document {
    /// Create a top-level document containing only a `body`.
    pub fn new(url: impl Into<String>) -> Self {
        let mut body = Element::new("body");
        body.connected = true;
        Self {
            url: url.into(),
            top_level: true,
            viewport: ViewportInfo::default(),
            nodes: vec![body],
            events: Vec::new(),
        }
    }

    /// Mark this document as loaded inside a frame.
    pub fn in_frame(mut self) -> Self {
        self.top_level = false;
        self
    }

    pub fn with_viewport(mut self, viewport: ViewportInfo) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client-side route change.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn is_top_level(&self) -> bool {
        self.top_level
    }

    pub fn viewport(&self) -> &ViewportInfo {
        &self.viewport
    }

    pub fn append(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        element.parent_id = Some(parent);
        element.children.clear();
        element.connected = self.is_connected(parent);
        self.nodes.push(element);
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    /// Whether the element is still attached to the page.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|e| e.connected)
    }

    /// Detach an element and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.body() {
            return;
        }
        if let Some(parent) = self.nodes.get(id.0).and_then(|e| e.parent_id) {
            if let Some(parent) = self.nodes.get_mut(parent.0) {
                parent.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.nodes.get_mut(current.0) {
                element.connected = false;
                stack.extend(element.children.iter().copied());
            }
        }
    }

    /// Connected elements under `root` (inclusive) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_connected(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(element) = self.nodes.get(current.0) {
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    /// Form controls under `root` in document order.
    pub fn form_controls(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(Element::is_form_control))
            .collect()
    }

    /// Nearest `form` ancestor.
    pub fn enclosing_form(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.get(id)?.parent_id;
        while let Some(candidate) = current {
            let element = self.get(candidate)?;
            if element.tag_name == "form" {
                return Some(candidate);
            }
            current = element.parent_id;
        }
        None
    }

    pub fn set_data(&mut self, id: NodeId, key: &str, value: &str) {
        if let Some(element) = self.nodes.get_mut(id.0) {
            element.attributes.data.insert(key.to_string(), value.to_string());
        }
    }

    /// Set a value without dispatching anything, as typing would.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(element) = self.nodes.get_mut(id.0) {
            element.value = value.to_string();
        }
    }

    pub fn dispatch(&mut self, target: NodeId, kind: DomEventKind) {
        let bubbles = !matches!(kind, DomEventKind::Highlight);
        self.events.push(DomEvent {
            target,
            kind,
            bubbles,
        });
    }

    /// Events not yet taken by the host.
    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    /// Hand the queued events to the host, leaving the queue empty.
    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events dispatched on one element, in order.
    pub fn events_for(&self, target: NodeId) -> Vec<DomEventKind> {
        self.events
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.kind)
            .collect()
    }
}
