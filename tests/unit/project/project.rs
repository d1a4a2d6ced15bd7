use std::path::PathBuf;

use super::*;
use crate::assets::decode::encode_png;
use crate::assets::fonts::FontBook;
use crate::layer::model::TextAlign;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("project_unit").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn partial_layers_take_defaults_and_are_clamped() {
    let p = Project::from_json(
        r##"{"image":"a.png","layers":[{"id":"t","text":"Hi","fontSize":9000,"textAlign":"right","color":"#00ff00"}]}"##,
    )
    .unwrap();
    assert_eq!(p.blur_px, 5.0);
    assert!(p.mask.is_none());
    let layers = p.text_layers();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].text, "Hi");
    assert_eq!(layers[0].font_size, 400.0);
    assert_eq!(layers[0].text_align, TextAlign::Right);
    assert_eq!(layers[0].x, 50.0);
    assert_eq!(layers[0].font_family, "Arial");
}

#[test]
fn duplicate_ids_and_unknown_keys_are_rejected() {
    let dup = r#"{"image":"a.png","layers":[{"id":"a"},{"id":"a"}]}"#;
    assert!(matches!(
        Project::from_json(dup).unwrap_err(),
        TextBehindError::Validation(_)
    ));
    let unknown = r#"{"image":"a.png","blur":3}"#;
    assert!(matches!(
        Project::from_json(unknown).unwrap_err(),
        TextBehindError::Serde(_)
    ));
}

#[test]
fn misspelled_layer_keys_are_rejected() {
    let err = Project::from_json(r#"{"image":"a.png","layers":[{"id":"t","fontsize":90}]}"#)
        .unwrap_err();
    let TextBehindError::Serde(msg) = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(msg.contains("fontsize"), "{msg}");

    let ok = Project::from_json(r#"{"image":"a.png","layers":[{"id":"t","fontSize":90}]}"#)
        .unwrap();
    assert_eq!(ok.text_layers()[0].font_size, 90.0);
}

#[test]
fn blur_outside_the_slider_range_is_rejected() {
    for json in [
        r#"{"image":"a.png","blur_px":50}"#,
        r#"{"image":"a.png","blur_px":-1}"#,
    ] {
        assert!(matches!(
            Project::from_json(json).unwrap_err(),
            TextBehindError::Validation(_)
        ));
    }
    let edge = Project::from_json(r#"{"image":"a.png","blur_px":20}"#).unwrap();
    assert_eq!(edge.blur_px, 20.0);
}

#[test]
fn json_round_trip_keeps_layers() {
    let mut layer = TextLayer::new(LayerId::from("x")).with_text("Round");
    layer.rotation = 30.0;
    let p = Project {
        image: PathBuf::from("img.png"),
        mask: Some(PathBuf::from("mask.png")),
        blur_px: 7.5,
        layers: vec![ProjectLayer::from_layer(&layer)],
    };
    let back = Project::from_json(&p.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back.text_layers(), vec![layer]);
    assert_eq!(back.mask, p.mask);
    assert_eq!(back.blur_px, 7.5);
}

#[test]
fn relative_paths_resolve_against_the_project_file() {
    let p = Project::from_json(r#"{"image":"img/a.png","mask":"/abs/m.png"}"#)
        .unwrap()
        .resolve_paths(Path::new("/work/proj"));
    assert_eq!(p.image, PathBuf::from("/work/proj/img/a.png"));
    assert_eq!(p.mask, Some(PathBuf::from("/abs/m.png")));
}

#[test]
fn load_and_render_with_mask() {
    let dir = scratch("render_with_mask");
    let image = [10u8, 200, 30, 255].repeat(16);
    std::fs::write(dir.join("photo.png"), encode_png(4, 4, &image).unwrap()).unwrap();
    let mask = [255u8, 255, 255, 255].repeat(16);
    std::fs::write(dir.join("mask.png"), encode_png(4, 4, &mask).unwrap()).unwrap();
    std::fs::write(
        dir.join("project.json"),
        r#"{"image":"photo.png","mask":"mask.png","blur_px":3,"layers":[]}"#,
    )
    .unwrap();

    let project = Project::load(&dir.join("project.json")).unwrap();
    let (_, matte) = project.load_sources(&MaskOpts::default()).unwrap();
    assert_eq!(matte.unwrap().alpha(), &[255u8; 16]);

    let mut renderer = LayerStackRenderer::with_font_book(FontBook::empty(), 2.0);
    let raster = project.render(&mut renderer, &MaskOpts::default()).unwrap();
    assert_eq!(raster.pixel(1, 1), Some([10, 200, 30, 255]));
}

#[test]
fn missing_image_is_reported() {
    let p = Project::from_json(r#"{"image":"does/not/exist.png"}"#).unwrap();
    let mut renderer = LayerStackRenderer::with_font_book(FontBook::empty(), 2.0);
    assert!(p.render(&mut renderer, &MaskOpts::default()).is_err());
}
