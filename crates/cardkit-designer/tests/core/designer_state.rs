use cardkit_core::DocumentError;
use cardkit_designer::model::TextPatch;
use cardkit_designer::{ContentPatch, DesignerState, LayerNode, LayerPatch, Orientation};

#[test]
fn test_add_layer_goes_on_top_with_unique_id() {
    let mut state = DesignerState::new();
    let a = state.add_layer(LayerNode::text("A", 0.0, 0.0)).unwrap();
    let b = state.add_layer(LayerNode::icon("phone", 10.0, 10.0)).unwrap();
    let c = state.add_layer(LayerNode::text("C", 20.0, 20.0)).unwrap();

    assert!(!a.is_empty() && !b.is_empty() && !c.is_empty());
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(state.document().layer_index(&c), Some(2));
    assert_eq!(state.document().layer_count(), 3);
}

#[test]
fn test_explicit_id_is_kept_and_duplicates_rejected() {
    let mut state = DesignerState::new();
    let id = state
        .add_layer(LayerNode::text("Name", 0.0, 0.0).with_id("name"))
        .unwrap();
    assert_eq!(id, "name");

    let before = state.document().clone();
    let err = state
        .add_layer(LayerNode::text("Again", 0.0, 0.0).with_id("name"))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Validation(_)));
    assert_eq!(state.document(), &before);
}

#[test]
fn test_unknown_id_leaves_state_unchanged() {
    let mut state = DesignerState::new();
    state.add_layer(LayerNode::text("Hello", 0.0, 0.0)).unwrap();
    let before = state.document().clone();
    let revision = state.revision();
    let undo_depth = state.history().undo_count();

    let err = state
        .update_layer("missing", &LayerPatch::position(1.0, 1.0))
        .unwrap_err();
    assert_eq!(err, DocumentError::not_found("missing"));

    let err = state.remove_layer("missing").unwrap_err();
    assert_eq!(err, DocumentError::not_found("missing"));

    assert!(state.reorder_layer("missing", 0).is_err());

    assert_eq!(state.document(), &before);
    assert_eq!(state.revision(), revision);
    assert_eq!(state.history().undo_count(), undo_depth);
}

#[test]
fn test_type_mismatch_patch_rejected() {
    let mut state = DesignerState::new();
    let id = state.add_layer(LayerNode::icon("star", 0.0, 0.0)).unwrap();
    let err = state
        .update_layer(&id, &LayerPatch::content(ContentPatch::Text(TextPatch::text("x"))))
        .unwrap_err();
    assert!(matches!(err, DocumentError::TypeMismatch { .. }));
}

#[test]
fn test_drag_gesture_is_one_undo_step() {
    let mut state = DesignerState::new();
    let id = state.add_layer(LayerNode::icon("star", 0.0, 0.0)).unwrap();
    let depth = state.history().undo_count();

    state.begin_gesture("Move layer");
    for step in 1..=20 {
        let v = step as f64 * 2.0;
        state.update_layer(&id, &LayerPatch::position(v, v)).unwrap();
    }
    assert_eq!(state.document().layer(&id).unwrap().x, 40.0);
    assert!(state.end_gesture());

    assert_eq!(state.history().undo_count(), depth + 1);
    assert_eq!(state.undo_labels()[0], "Move layer");

    assert!(state.undo());
    assert_eq!(state.document().layer(&id).unwrap().x, 0.0);
    assert!(state.redo());
    assert_eq!(state.document().layer(&id).unwrap().x, 40.0);
}

#[test]
fn test_empty_gesture_commits_nothing() {
    let mut state = DesignerState::new();
    state.begin_gesture("Resize");
    assert!(state.is_gesture_active());
    assert!(!state.end_gesture());
    assert!(!state.can_undo());
}

#[test]
fn test_undo_during_gesture_reverts_only_the_gesture() {
    let mut state = DesignerState::new();
    let a = state.add_layer(LayerNode::icon("star", 5.0, 5.0)).unwrap();
    let b = state.add_layer(LayerNode::icon("heart", 50.0, 50.0)).unwrap();
    let undo_before = state.history().undo_count();

    state.begin_gesture("Move layer");
    state.update_layer(&b, &LayerPatch::position(90.0, 90.0)).unwrap();
    assert!(state.undo());

    assert!(!state.is_gesture_active());
    assert!(state.document().layer(&a).is_some());
    assert_eq!(state.document().layer(&b).unwrap().x, 50.0);
    assert_eq!(state.history().undo_count(), undo_before);
    assert_eq!(state.history().redo_count(), 1);

    assert!(state.redo());
    assert_eq!(state.document().layer(&b).unwrap().x, 90.0);
}

#[test]
fn test_revision_guard_goes_stale_on_edit() {
    let mut state = DesignerState::new();
    let guard = state.revision_guard();
    assert!(guard.is_current());

    state.add_layer(LayerNode::text("x", 0.0, 0.0)).unwrap();
    assert!(!guard.is_current());

    let fresh = state.revision_guard();
    assert!(fresh.is_current());
    state.undo();
    assert!(!fresh.is_current());
}

#[test]
fn test_orientation_only_commits_on_change() {
    let mut state = DesignerState::new();
    assert!(!state.set_orientation(Orientation::Landscape));
    assert!(!state.can_undo());
    assert!(state.set_orientation(Orientation::Portrait));
    assert_eq!(state.document().orientation, Orientation::Portrait);
    assert!(state.can_undo());
}
