use serde_json::json;

use super::*;
use crate::layer::model::LayerId;

fn base() -> TextLayer {
    TextLayer::new(LayerId::new("base"))
}

#[test]
fn empty_patch_is_identity() {
    let p = LayerPatch::default();
    assert!(p.is_empty());
    assert_eq!(p.apply(&base()), base());
}

#[test]
fn patch_clamps_out_of_range_values() {
    let p = LayerPatch::default()
        .font_size(1000.0)
        .position(-10.0, 101.0)
        .rotation(-400.0)
        .opacity(-0.2)
        .outline(99.0, Color::WHITE)
        .shadow(-3.0, Color::BLACK);
    let l = p.apply(&base());
    assert_eq!(l.font_size, 400.0);
    assert_eq!((l.x, l.y), (0.0, 100.0));
    assert_eq!(l.rotation, -180.0);
    assert_eq!(l.opacity, 0.0);
    assert_eq!(l.outline_width, 10.0);
    assert_eq!(l.shadow_blur, 0.0);
    assert!(l.is_in_bounds());
}

#[test]
fn non_finite_values_keep_current_field() {
    let l = LayerPatch::default()
        .font_size(f64::INFINITY)
        .opacity(f64::NAN)
        .apply(&base());
    assert_eq!(l.font_size, 24.0);
    assert_eq!(l.opacity, 1.0);
}

#[test]
fn patch_never_changes_identity_and_keeps_untouched_fields() {
    let l = LayerPatch::default()
        .text("Hi")
        .align(TextAlign::Right)
        .font_family("Georgia")
        .color(Color::rgba(1, 2, 3, 255))
        .apply(&base());
    assert_eq!(l.id, LayerId::new("base"));
    assert_eq!(l.text, "Hi");
    assert_eq!(l.text_align, TextAlign::Right);
    assert_eq!(l.font_family, "Georgia");
    assert_eq!(l.color, Color::rgba(1, 2, 3, 255));
    assert_eq!(l.font_size, base().font_size);
}

#[test]
fn patch_deserializes_from_partial_json() {
    let p: LayerPatch =
        serde_json::from_value(json!({"fontSize": 64, "color": "#ff0000", "textAlign": "left"}))
            .unwrap();
    assert_eq!(p.font_size, Some(64.0));
    assert_eq!(p.color, Some(Color::rgba(255, 0, 0, 255)));
    assert_eq!(p.text_align, Some(TextAlign::Left));
    assert!(p.text.is_none());

    assert!(serde_json::from_value::<LayerPatch>(json!({"color": "nope"})).is_err());
}

#[test]
fn full_patch_rebuilds_the_layer() {
    let mut layer = base();
    layer.rotation = -45.0;
    layer.text_align = TextAlign::Left;
    let rebuilt = LayerPatch::from_layer(&layer).apply(&TextLayer::new(layer.id.clone()));
    assert_eq!(rebuilt, layer);
}
