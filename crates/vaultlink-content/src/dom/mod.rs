//! Page model: elements, geometry and recorded events.

mod document;
mod dom_types;

pub use document::{DomEvent, DomEventKind, Document, Element, NodeId};
pub use dom_types::{BoundingBox, ElementAttributes, ViewportInfo};

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
