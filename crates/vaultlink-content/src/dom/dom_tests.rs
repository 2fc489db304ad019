use super::*;

#[test]
fn test_bounding_box_contains() {
    let bbox = BoundingBox::new(10.0, 20.0, 100.0, 30.0);
    assert!(bbox.contains(50.0, 35.0));
    assert!(bbox.contains(10.0, 20.0));
    assert!(!bbox.contains(5.0, 35.0));
    assert_eq!(bbox.bottom(), 50.0);
    assert_eq!(bbox.right(), 110.0);
}

#[test]
fn test_document_order() {
    let mut doc = Document::new("https://example.com");
    let form = doc.append(doc.body(), Element::form());
    let a = doc.append(form, Element::input("text"));
    let b = doc.append(doc.body(), Element::input("text"));
    let c = doc.append(form, Element::input("password"));

    assert_eq!(doc.form_controls(doc.body()), vec![a, c, b]);
    assert_eq!(doc.form_controls(form), vec![a, c]);
}

#[test]
fn test_enclosing_form() {
    let mut doc = Document::new("https://example.com");
    let form = doc.append(doc.body(), Element::form());
    let inside = doc.append(form, Element::input("text"));
    let outside = doc.append(doc.body(), Element::input("text"));

    assert_eq!(doc.enclosing_form(inside), Some(form));
    assert_eq!(doc.enclosing_form(outside), None);
}

#[test]
fn test_remove_detaches_subtree() {
    let mut doc = Document::new("https://example.com");
    let form = doc.append(doc.body(), Element::form());
    let input = doc.append(form, Element::input("text"));

    doc.remove(form);
    assert!(!doc.is_connected(form));
    assert!(!doc.is_connected(input));
    assert!(doc.form_controls(doc.body()).is_empty());

    doc.remove(doc.body());
    assert!(doc.is_connected(doc.body()));
}

#[test]
fn test_input_type_defaults_to_text() {
    let mut element = Element::new("input");
    assert_eq!(element.input_type(), "text");
    element.attributes.r#type = Some("PASSWORD".to_string());
    assert_eq!(element.input_type(), "password");
}

#[test]
fn test_submit_controls() {
    assert!(Element::button("submit").is_submit_control());
    assert!(Element::new("button").is_submit_control());
    assert!(!Element::button("button").is_submit_control());
    assert!(Element::input("submit").is_submit_control());
    assert!(!Element::input("text").is_submit_control());
}

#[test]
fn test_dispatch_records_events() {
    let mut doc = Document::new("https://example.com");
    let input = doc.append(doc.body(), Element::input("text"));
    doc.dispatch(input, DomEventKind::Input);
    doc.dispatch(input, DomEventKind::Highlight);

    assert_eq!(doc.events().len(), 2);
    assert!(doc.events()[0].bubbles);
    assert!(!doc.events()[1].bubbles);
    assert_eq!(
        doc.events_for(input),
        vec![DomEventKind::Input, DomEventKind::Highlight]
    );

    let taken = doc.take_events();
    assert_eq!(taken.len(), 2);
    assert_eq!(taken[0].kind, DomEventKind::Input);
    assert!(doc.events().is_empty());
    assert!(doc.events_for(input).is_empty());
}

#[test]
fn test_frame_and_route_change() {
    let mut doc = Document::new("https://example.com/a").in_frame();
    assert!(!doc.is_top_level());
    doc.set_url("https://example.com/b");
    assert_eq!(doc.url(), "https://example.com/b");
}
