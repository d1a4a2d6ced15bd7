use super::*;
use crate::foundation::core::{Canvas, Point};
use crate::layer::model::LayerId;

fn surface(w: u32, h: u32) -> Surface {
    Surface::acquire(Canvas::new(w, h).unwrap()).unwrap()
}

fn line(width: f32, baseline: f32) -> ShapedLine {
    ShapedLine {
        glyphs: Vec::new(),
        width,
        baseline,
        font_size: 24.0,
    }
}

fn fixture_fonts() -> FontBook {
    let mut fonts = FontBook::empty();
    fonts.register_font_data(std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap());
    fonts
}

fn plain_layer(id: &str, text: &str, color: Color) -> TextLayer {
    let mut layer = TextLayer::new(LayerId::from(id)).with_text(text);
    layer.font_size = 48.0;
    layer.opacity = 1.0;
    layer.outline_width = 0.0;
    layer.shadow_blur = 0.0;
    layer.rotation = 0.0;
    layer.color = color;
    layer.text_align = TextAlign::Center;
    layer.x = 50.0;
    layer.y = 65.0;
    layer
}

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn anchor_lands_on_baseline_for_each_alignment() {
    let target = surface(200, 100);
    let shaped = line(80.0, 20.0);
    let mut layer = TextLayer::new(LayerId::from("a"));
    layer.x = 25.0;
    layer.y = 50.0;

    layer.text_align = TextAlign::Left;
    let t = layer_transform(&target, &layer, &shaped);
    assert!(approx(t * Point::new(0.0, 20.0), Point::new(50.0, 50.0)));

    layer.text_align = TextAlign::Center;
    let t = layer_transform(&target, &layer, &shaped);
    assert!(approx(t * Point::new(40.0, 20.0), Point::new(50.0, 50.0)));

    layer.text_align = TextAlign::Right;
    let t = layer_transform(&target, &layer, &shaped);
    assert!(approx(t * Point::new(80.0, 20.0), Point::new(50.0, 50.0)));
}

#[test]
fn rotation_turns_about_the_anchor() {
    let target = surface(100, 100);
    let shaped = line(0.0, 0.0);
    let mut layer = TextLayer::new(LayerId::from("r"));
    layer.text_align = TextAlign::Left;
    layer.rotation = 90.0;
    let t = layer_transform(&target, &layer, &shaped);
    assert!(approx(t * Point::new(0.0, 0.0), Point::new(50.0, 50.0)));
    // +x in layout space points down the canvas after a clockwise quarter turn.
    assert!(approx(t * Point::new(10.0, 0.0), Point::new(50.0, 60.0)));
}

#[test]
fn empty_text_and_invisible_layers_are_skipped() {
    let mut fonts = FontBook::empty();
    let mut painter = TextPainter::new(2.0);
    let mut target = surface(16, 16);

    let empty = TextLayer::new(LayerId::from("e")).with_text("");
    assert!(!painter.paint_layer(&mut fonts, &mut target, &empty).unwrap());

    let mut hidden = TextLayer::new(LayerId::from("h"));
    hidden.opacity = 0.0;
    assert!(!painter.paint_layer(&mut fonts, &mut target, &hidden).unwrap());
    assert!(target.data().iter().all(|&b| b == 0));
}

#[test]
fn missing_font_skips_the_layer() {
    let mut fonts = FontBook::empty();
    let mut painter = TextPainter::new(2.0);
    let mut target = surface(16, 16);
    let layer = TextLayer::new(LayerId::from("x"));
    assert!(!painter.paint_layer(&mut fonts, &mut target, &layer).unwrap());
}

#[test]
fn paints_text_with_the_fixture_font() {
    let mut fonts = fixture_fonts();
    let mut painter = TextPainter::new(2.0);
    let mut target = surface(160, 80);
    let layer = plain_layer("t", "Hi", Color::WHITE);
    assert!(painter.paint_layer(&mut fonts, &mut target, &layer).unwrap());
    assert!(target.data().chunks_exact(4).any(|px| px[3] > 0));

    // The same layer painted twice onto fresh targets is pixel-identical.
    let mut again = surface(160, 80);
    painter.paint_layer(&mut fonts, &mut again, &layer).unwrap();
    assert_eq!(target.data(), again.data());
}

#[test]
fn outline_is_stroked_under_the_fill() {
    let mut fonts = fixture_fonts();
    let mut painter = TextPainter::new(2.0);
    let red = |px: &[u8]| px[0] > 200 && px[1] < 40 && px[2] < 40 && px[3] > 200;

    let mut layer = plain_layer("o", "H", Color::WHITE);
    let mut plain = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut plain, &layer).unwrap();
    assert!(!plain.data().chunks_exact(4).any(red));

    layer.outline_width = 6.0;
    layer.outline_color = Color::rgba(255, 0, 0, 255);
    let mut outlined = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut outlined, &layer).unwrap();
    assert!(outlined.data().chunks_exact(4).any(red));
    // The fill still covers the glyph interior.
    assert!(
        outlined
            .data()
            .chunks_exact(4)
            .any(|px| px == [255, 255, 255, 255])
    );
}

#[test]
fn half_opacity_halves_the_fill() {
    let mut fonts = fixture_fonts();
    let mut painter = TextPainter::new(2.0);
    let max_alpha = |s: &Surface| s.data().chunks_exact(4).map(|px| px[3]).max().unwrap_or(0);

    let mut layer = plain_layer("a", "H", Color::WHITE);
    let mut full = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut full, &layer).unwrap();
    assert_eq!(max_alpha(&full), 255);

    layer.opacity = 0.5;
    let mut half = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut half, &layer).unwrap();
    let a = max_alpha(&half);
    assert!((120..=135).contains(&a), "max alpha {a}");
}

#[test]
fn shadow_adds_coverage_below_the_glyphs() {
    let mut fonts = fixture_fonts();
    let mut painter = TextPainter::new(2.0);
    let mut layer = plain_layer("s", "I", Color::WHITE);

    let mut plain = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut plain, &layer).unwrap();

    layer.shadow_blur = 8.0;
    layer.shadow_color = Color::BLACK;
    let mut shadowed = surface(120, 80);
    painter.paint_layer(&mut fonts, &mut shadowed, &layer).unwrap();

    let coverage = |s: &Surface| s.data().chunks_exact(4).filter(|px| px[3] > 0).count();
    assert!(coverage(&shadowed) > coverage(&plain));
}

#[test]
fn shadow_blur_matches_a_whole_canvas_blur() {
    let mut fonts = fixture_fonts();
    let mut painter = TextPainter::new(2.0);
    let mut layer = plain_layer("s", "Hg", Color::WHITE);
    layer.shadow_blur = 12.0;
    layer.shadow_color = Color::BLACK;

    let mut painted = surface(240, 120);
    painter.paint_layer(&mut fonts, &mut painted, &layer).unwrap();

    let font = fonts.resolve(&layer.font_family).unwrap();
    let shaped = painter
        .layout
        .shape_line(&layer.text, &font, layer.font_size as f32)
        .unwrap();
    let cpu_font = painter.cpu_font(&font);
    let mut expected = surface(240, 120);
    let transform = layer_transform(&expected, &layer, &shaped);
    let silhouette = rasterize_glyphs(
        &expected,
        &cpu_font,
        &shaped,
        Affine::translate(Vec2::new(0.0, 2.0)) * transform,
        None,
        Color::BLACK,
        1.0,
    )
    .unwrap();
    let blurred = gaussian_blur_premul(silhouette.data(), 240, 120, 6.0).unwrap();
    over_in_place(expected.data_mut(), &blurred, 1.0).unwrap();
    let glyphs =
        rasterize_glyphs(&expected, &cpu_font, &shaped, transform, None, Color::WHITE, 1.0)
            .unwrap();
    over_in_place(expected.data_mut(), glyphs.data(), 1.0).unwrap();

    assert_eq!(painted.data(), expected.data());
}
