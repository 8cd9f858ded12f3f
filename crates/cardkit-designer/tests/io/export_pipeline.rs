use cardkit_core::{Color, ExportError, ExportFormat, PrintSpec};
use cardkit_designer::export::{ExportOptions, ExportPipeline};
use cardkit_designer::{AssetLibrary, Background, DesignerState, Document, LayerNode};
use std::sync::Arc;

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

fn reference_doc() -> Document {
    Document::new("Reference", 600.0, 400.0)
        .unwrap()
        .with_background(Background::solid(BLUE))
        .unwrap()
}

fn png_bytes(color: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba(color));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn pipeline() -> (Arc<AssetLibrary>, ExportPipeline) {
    let library = Arc::new(AssetLibrary::new());
    let pipeline = ExportPipeline::new(library.clone());
    (library, pipeline)
}

fn near(a: u8, b: u8) -> bool {
    a.abs_diff(b) <= 8
}

#[tokio::test]
async fn test_png_export_size_and_bleed() {
    let (_, pipeline) = pipeline();
    let options = ExportOptions::new(ExportFormat::Png).with_background(RED);
    let out = pipeline.export(&reference_doc(), &options, None).await.unwrap();

    assert!(out.width.abs_diff(2571) <= 1, "width {}", out.width);
    assert!(out.height.abs_diff(1738) <= 1, "height {}", out.height);
    assert_eq!(out.mime_type, "image/png");
    assert_eq!(out.filename, "reference-300dpi.png");

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!((decoded.width(), decoded.height()), (out.width, out.height));
    assert_eq!(decoded.get_pixel(10, 10).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(out.width - 10, out.height - 10).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(out.width / 2, out.height / 2).0, [0, 0, 255, 255]);
}

#[tokio::test]
async fn test_jpeg_export_decodes() {
    let (_, pipeline) = pipeline();
    let options = ExportOptions::new(ExportFormat::Jpeg).with_print_spec(PrintSpec::default().with_dpi(150.0));
    let out = pipeline.export(&reference_doc(), &options, None).await.unwrap();
    assert_eq!(out.mime_type, "image/jpeg");

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert_eq!((decoded.width(), decoded.height()), (out.width, out.height));
    let [r, g, b] = decoded.get_pixel(out.width / 2, out.height / 2).0;
    assert!(near(r, 0) && near(g, 0) && near(b, 255), "{:?}", (r, g, b));
    let [r, g, b] = decoded.get_pixel(2, 2).0;
    assert!(near(r, 255) && near(g, 255) && near(b, 255), "{:?}", (r, g, b));
}

#[tokio::test]
async fn test_pdf_export_single_page_with_image() {
    let (_, pipeline) = pipeline();
    let options = ExportOptions::new(ExportFormat::Pdf);
    let out = pipeline.export(&reference_doc(), &options, None).await.unwrap();
    assert!(out.bytes.starts_with(b"%PDF-"));

    let pdf = lopdf::Document::load_mem(&out.bytes).unwrap();
    let pages = pdf.get_pages();
    assert_eq!(pages.len(), 1);

    let page_id = *pages.values().next().unwrap();
    let page = pdf.get_object(page_id).unwrap().as_dict().unwrap();
    let media_box: Vec<i64> = page
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_i64().unwrap())
        .collect();
    assert_eq!(media_box, vec![0, 0, out.width as i64, out.height as i64]);

    let xobjects = page
        .get(b"Resources")
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"XObject")
        .unwrap()
        .as_dict()
        .unwrap();
    assert_eq!(xobjects.len(), 1);
    let image_id = xobjects.get(b"Im0").unwrap().as_reference().unwrap();
    let image = pdf.get_object(image_id).unwrap().as_stream().unwrap();
    assert_eq!(image.dict.get(b"Width").unwrap().as_i64().unwrap(), out.width as i64);
}

#[tokio::test]
async fn test_logo_is_composited() {
    let (library, pipeline) = pipeline();
    let source = library.ingest(png_bytes([255, 0, 0, 255]), "logo.png");

    let (doc, _) = reference_doc()
        .with_layer_added(LayerNode::logo(source, 0.0, 0.0, 600.0, 400.0))
        .unwrap();
    let options = ExportOptions::new(ExportFormat::Png).with_print_spec(PrintSpec::default().with_dpi(72.0));
    let out = pipeline.export(&doc, &options, None).await.unwrap();

    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(out.width / 2, out.height / 2).0, [255, 0, 0, 255]);
}

#[tokio::test]
async fn test_missing_image_fails_rasterization() {
    let (_, pipeline) = pipeline();
    let (doc, _) = reference_doc()
        .with_layer_added(LayerNode::logo("asset://nope/missing.png", 0.0, 0.0, 50.0, 50.0))
        .unwrap();
    let err = pipeline
        .export(&doc, &ExportOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::RasterizationFailed(_)), "{:?}", err);
}

#[tokio::test]
async fn test_hidden_logo_with_missing_asset_exports() {
    let (_, pipeline) = pipeline();
    let mut hidden = LayerNode::logo("asset://gone/x.png", 0.0, 0.0, 50.0, 50.0);
    hidden.visible = false;
    let mut hidden_group =
        LayerNode::group(vec![LayerNode::logo("asset://gone/y.png", 0.0, 0.0, 20.0, 20.0)]);
    hidden_group.visible = false;

    let (doc, _) = reference_doc().with_layer_added(hidden).unwrap();
    let (doc, _) = doc.with_layer_added(hidden_group).unwrap();
    assert!(doc.image_refs().is_empty());

    let out = pipeline
        .export(&doc, &ExportOptions::default(), None)
        .await
        .unwrap();
    assert!(out.width.abs_diff(2571) <= 1);
}

#[tokio::test]
async fn test_undecodable_image_fails_rasterization() {
    let (library, pipeline) = pipeline();
    let source = library.ingest(b"definitely not an image".to_vec(), "junk.png");
    let (doc, _) = reference_doc()
        .with_layer_added(LayerNode::logo(source, 0.0, 0.0, 50.0, 50.0))
        .unwrap();
    let err = pipeline
        .export(&doc, &ExportOptions::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::RasterizationFailed(_)));
}

#[tokio::test]
async fn test_stale_export_is_superseded() {
    let (library, pipeline) = pipeline();
    let source = library.ingest(png_bytes([0, 255, 0, 255]), "logo.png");

    let mut state = DesignerState::with_document(reference_doc());
    state.add_layer(LayerNode::logo(source, 10.0, 10.0, 40.0, 40.0)).unwrap();

    let snapshot = state.snapshot();
    let guard = state.revision_guard();
    state.add_layer(LayerNode::text("late edit", 0.0, 0.0)).unwrap();

    let err = pipeline
        .export(&snapshot, &ExportOptions::default(), Some(&guard))
        .await
        .unwrap_err();
    assert_eq!(err, ExportError::Superseded);

    let fresh = state.revision_guard();
    assert!(pipeline
        .export(state.document(), &ExportOptions::default(), Some(&fresh))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_invalid_options_rejected() {
    let (_, pipeline) = pipeline();
    let options = ExportOptions::default().with_print_spec(PrintSpec::default().with_bleed_mm(-1.0));
    let err = pipeline
        .export(&reference_doc(), &options, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::InvalidOptions(_)));
}
