use cardkit_core::PrintSpec;
use cardkit_designer::serialization::FILE_FORMAT_VERSION;
use cardkit_designer::{DesignFile, DesignerState, Document, LayerNode};
use tempfile::TempDir;

#[test]
fn test_design_file_round_trip_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("card.cardkit.json");

    let (doc, _) = Document::business_card()
        .with_layer_added(LayerNode::icon("mail", 20.0, 20.0))
        .unwrap();
    DesignFile::new(doc.clone())
        .with_print_spec(PrintSpec::default().with_dpi(600.0))
        .save_to_file(&path)
        .unwrap();

    let loaded = DesignFile::load_from_file(&path).unwrap();
    assert_eq!(loaded.version, FILE_FORMAT_VERSION);
    assert_eq!(loaded.print.map(|p| p.dpi), Some(600.0));
    assert_eq!(loaded.document, doc);
}

#[test]
fn test_designer_state_file_workflow() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.cardkit.json");

    let mut state = DesignerState::new();
    state.add_layer(LayerNode::text("Hello", 0.0, 0.0)).unwrap();
    assert!(state.is_modified);
    state.save_to_file(&path).unwrap();
    assert!(!state.is_modified);
    assert_eq!(state.current_file_path.as_deref(), Some(path.as_path()));

    let mut reopened = DesignerState::new();
    reopened.load_from_file(&path).unwrap();
    assert_eq!(reopened.document(), state.document());
    assert!(!reopened.can_undo());
}

#[test]
fn test_missing_ids_are_assigned_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.cardkit.json");

    let mut doc = Document::business_card();
    doc.layers.push(LayerNode::text("no id", 0.0, 0.0));
    std::fs::write(
        &path,
        serde_json::to_string(&DesignFile::new(doc)).unwrap(),
    )
    .unwrap();

    let mut state = DesignerState::new();
    state.load_from_file(&path).unwrap();
    let layer = &state.document().layers[0];
    assert!(!layer.id.is_empty());
    assert_eq!(layer.name, "no id");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.cardkit.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(DesignFile::load_from_file(&path).is_err());
    assert!(DesignFile::load_from_file(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_resave_keeps_created_and_print_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kept.cardkit.json");

    let mut original = DesignFile::new(Document::business_card())
        .with_print_spec(PrintSpec::default().with_dpi(600.0));
    original.metadata.created = chrono::DateTime::from_timestamp(1_600_000_000, 0).unwrap();
    original.metadata.author = "Jane Doe".into();
    original.save_to_file(&path).unwrap();

    let mut state = DesignerState::new();
    state.load_from_file(&path).unwrap();
    state.add_layer(LayerNode::text("Hello", 0.0, 0.0)).unwrap();
    state.save_to_file(&path).unwrap();

    let saved = DesignFile::load_from_file(&path).unwrap();
    assert_eq!(saved.metadata.created, original.metadata.created);
    assert_eq!(saved.metadata.author, "Jane Doe");
    assert!(saved.metadata.modified > original.metadata.created);
    assert_eq!(saved.print.map(|p| p.dpi), Some(600.0));
    assert_eq!(saved.document.layers.len(), 1);
}
