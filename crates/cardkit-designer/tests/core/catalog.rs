use cardkit_designer::catalog::{icon_catalog, template_catalog, CatalogFilter, CatalogItem};
use cardkit_designer::{DesignerState, LayerType};

#[test]
fn test_template_instance_loads_into_state() {
    let catalog = template_catalog();
    let entry = catalog.get("accent-bar").unwrap();

    let mut state = DesignerState::new();
    state.load_document(entry.instantiate()).unwrap();
    assert_eq!(state.document().layer_count(), entry.document.layers.len());
    assert!(!state.can_undo());

    for layer in &state.document().layers {
        assert!(entry.document.layer(&layer.id).is_none());
    }
}

#[test]
fn test_icon_entry_adds_icon_layer() {
    let icons = icon_catalog();
    let mut state = DesignerState::new();
    let entry = icons.filter(&CatalogFilter::query("envelope"))[0];
    let id = state.add_layer(entry.to_layer(12.0, 12.0)).unwrap();
    assert_eq!(state.document().layer(&id).unwrap().layer_type(), LayerType::Icon);
}

#[test]
fn test_filters_combine() {
    let templates = template_catalog();
    let filter = CatalogFilter::category("PROFESSIONAL").with_tag("color");
    let hits = templates.filter(&filter);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), "accent-bar");

    assert_eq!(templates.filter(&CatalogFilter::default()).len(), templates.len());
    assert!(templates.categories().contains(&"creative"));
}
