use cardkit_core::units::mm_to_pixels;
use cardkit_core::PrintSpec;
use cardkit_designer::{Document, PrintGuides};

#[test]
fn test_guides_for_business_card() {
    let doc = Document::business_card();
    let guides = PrintGuides::for_document(&doc, &PrintSpec::default());
    let margin = mm_to_pixels(3.0, 72.0);

    assert!((guides.bleed_px - margin).abs() < 1e-9);
    assert!((guides.bleed.x + margin).abs() < 1e-9);
    assert!((guides.safe.x - margin).abs() < 1e-9);
    assert!(guides.bleed.strictly_contains(&guides.canvas));
    assert!(guides.canvas.strictly_contains(&guides.safe));
}

#[test]
fn test_guides_ignore_export_dpi() {
    let at_300 = PrintGuides::compute(600.0, 400.0, &PrintSpec::default());
    let at_1200 = PrintGuides::compute(600.0, 400.0, &PrintSpec::default().with_dpi(1200.0));
    assert_eq!(at_300, at_1200);
}

#[test]
fn test_safe_zone_strictly_inside_when_margins_fit() {
    // 2 * safe_mm < min(width_mm, height_mm)
    for (w, h) in [(252.0, 144.0), (60.0, 30.0), (18.0, 18.0)] {
        let guides = PrintGuides::compute(w, h, &PrintSpec::default());
        assert!(guides.canvas.strictly_contains(&guides.safe), "{}x{}", w, h);
        assert!(guides.bleed.strictly_contains(&guides.canvas));
    }
}
