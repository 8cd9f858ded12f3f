use cardkit_core::{Color, DocumentError};
use cardkit_designer::model::{GroupPatch, ShapePatch};
use cardkit_designer::{
    Background, ContentPatch, Document, LayerContent, LayerNode, LayerPatch, ShapeKind,
};

#[test]
fn test_business_card_defaults() {
    let doc = Document::business_card();
    assert_eq!((doc.width, doc.height), (252.0, 144.0));
    let (w_mm, h_mm) = doc.size_mm();
    assert!((w_mm - 88.9).abs() < 0.01);
    assert!((h_mm - 50.8).abs() < 0.01);
    assert!(doc.layers.is_empty());
    assert!(doc.validate().is_ok());
}

#[test]
fn test_invalid_dimensions() {
    assert!(matches!(
        Document::new("bad", 0.0, 10.0),
        Err(DocumentError::InvalidDimensions { .. })
    ));
    assert!(Document::new("bad", f64::NAN, 10.0).is_err());
}

#[test]
fn test_edits_do_not_mutate_source() {
    let doc = Document::business_card();
    let (added, id) = doc
        .with_layer_added(LayerNode::shape(ShapeKind::Triangle, 0.0, 0.0, 20.0, 20.0))
        .unwrap();
    assert!(doc.layers.is_empty());

    let moved = added.with_layer_updated(&id, &LayerPatch::position(5.0, 6.0)).unwrap();
    assert_eq!(added.layer(&id).unwrap().x, 0.0);
    assert_eq!(moved.layer(&id).unwrap().x, 5.0);
}

#[test]
fn test_locked_layer_accepts_only_flags() {
    let doc = Document::business_card();
    let (doc, id) = doc
        .with_layer_added(LayerNode::icon("heart", 0.0, 0.0))
        .unwrap();
    let doc = doc
        .with_layer_updated(&id, &LayerPatch::new().with_locked(true))
        .unwrap();

    assert!(doc.with_layer_updated(&id, &LayerPatch::position(9.0, 9.0)).is_err());
    let unlocked = doc
        .with_layer_updated(&id, &LayerPatch::new().with_locked(false))
        .unwrap();
    assert!(unlocked
        .with_layer_updated(&id, &LayerPatch::position(9.0, 9.0))
        .is_ok());
}

#[test]
fn test_shape_fill_patch() {
    let doc = Document::business_card();
    let (doc, id) = doc
        .with_layer_added(LayerNode::shape(
            ShapeKind::Rectangle { corner_radius: 4.0 },
            0.0,
            0.0,
            30.0,
            10.0,
        ))
        .unwrap();
    let patch = LayerPatch::content(ContentPatch::Shape(ShapePatch {
        fill: Some(Some(Color::rgb(255, 0, 0))),
        ..Default::default()
    }));
    let doc = doc.with_layer_updated(&id, &patch).unwrap();
    match &doc.layer(&id).unwrap().content {
        LayerContent::Shape(s) => assert_eq!(s.fill, Some(Color::rgb(255, 0, 0))),
        other => panic!("unexpected content {:?}", other),
    }
}

#[test]
fn test_group_children_get_ids_and_clashes_are_rejected() {
    let doc = Document::business_card();
    let (doc, existing) = doc
        .with_layer_added(LayerNode::text("Top", 0.0, 0.0))
        .unwrap();
    let (doc, group) = doc
        .with_layer_added(LayerNode::group(vec![
            LayerNode::icon("phone", 10.0, 10.0),
            LayerNode::text("555", 30.0, 10.0),
        ]))
        .unwrap();
    assert_eq!(doc.layer_ids().len(), 4);

    let clash = LayerPatch::content(ContentPatch::Group(GroupPatch {
        children: Some(vec![LayerNode::icon("mail", 0.0, 0.0).with_id(existing.clone())]),
    }));
    assert!(doc.with_layer_updated(&group, &clash).is_err());

    let fresh = LayerPatch::content(ContentPatch::Group(GroupPatch {
        children: Some(vec![LayerNode::icon("mail", 0.0, 0.0)]),
    }));
    let doc = doc.with_layer_updated(&group, &fresh).unwrap();
    let child = &doc.layer(&group).unwrap().children()[0];
    assert!(!child.id.is_empty());
    assert!(doc.find_layer(&child.id).is_some());
}

#[test]
fn test_reorder_clamps() {
    let mut doc = Document::business_card();
    let mut ids = Vec::new();
    for i in 0..3 {
        let (next, id) = doc
            .with_layer_added(LayerNode::text(format!("L{}", i), 0.0, 0.0))
            .unwrap();
        doc = next;
        ids.push(id);
    }
    let (moved, index) = doc.with_layer_moved(&ids[0], 99).unwrap();
    assert_eq!(index, 2);
    assert_eq!(moved.layers[2].id, ids[0]);
}

#[test]
fn test_image_refs_deduplicated() {
    let doc = Document::business_card()
        .with_background(Background::pattern(Color::WHITE, "asset://p/dots.png", 1.0))
        .unwrap();
    let (doc, _) = doc
        .with_layer_added(LayerNode::logo("asset://l/logo.png", 0.0, 0.0, 10.0, 10.0))
        .unwrap();
    let (doc, _) = doc
        .with_layer_added(LayerNode::group(vec![LayerNode::logo(
            "asset://l/logo.png",
            0.0,
            0.0,
            10.0,
            10.0,
        )]))
        .unwrap();
    assert_eq!(
        doc.image_refs(),
        vec!["asset://p/dots.png".to_string(), "asset://l/logo.png".to_string()]
    );
}

#[test]
fn test_document_json_shape() {
    let (doc, _) = Document::business_card()
        .with_layer_added(LayerNode::icon("globe", 1.0, 2.0).with_id("g"))
        .unwrap();
    let value = serde_json::to_value(&doc).unwrap();
    let layer = &value["layers"][0];
    assert_eq!(layer["id"], "g");
    assert_eq!(layer["type"], "icon");
    assert_eq!(layer["icon"], "globe");

    let back: Document = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);
}
