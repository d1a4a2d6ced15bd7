use super::*;
use crate::assets::decode::decode_image;
use crate::layer::model::LayerId;

fn split_image(w: u32, h: u32) -> DecodedImage {
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for _y in 0..h {
        for x in 0..w {
            if x < w / 2 {
                rgba.extend_from_slice(&[255, 0, 0, 255]);
            } else {
                rgba.extend_from_slice(&[0, 0, 255, 255]);
            }
        }
    }
    DecodedImage::from_rgba8(w, h, rgba).unwrap()
}

fn renderer() -> LayerStackRenderer {
    LayerStackRenderer::with_font_book(FontBook::empty(), DEFAULT_SHADOW_OFFSET_Y)
}

fn input<'a>(
    image: &'a DecodedImage,
    matte: Option<&'a AlphaMatte>,
    layers: &'a [TextLayer],
    blur_px: f32,
) -> RenderInput<'a> {
    RenderInput {
        image,
        matte,
        layers,
        blur_px,
    }
}

#[test]
fn no_matte_no_blur_reproduces_the_image() {
    let image = split_image(8, 4);
    let raster = renderer().render(input(&image, None, &[], 0.0)).unwrap();
    assert_eq!(raster.data(), image.to_rgba8_premul().as_slice());
}

#[test]
fn no_matte_hides_the_blurred_background() {
    let image = split_image(8, 4);
    let sharp = renderer().render(input(&image, None, &[], 0.0)).unwrap();
    let blurred = renderer().render(input(&image, None, &[], 6.0)).unwrap();
    assert_eq!(sharp, blurred);
}

#[test]
fn empty_matte_shows_the_blurred_background() {
    let image = split_image(8, 4);
    let matte = AlphaMatte::from_alpha(8, 4, vec![0; 32]).unwrap();
    let raster = renderer()
        .render(input(&image, Some(&matte), &[], 2.0))
        .unwrap();
    // Pixels at the color boundary mix red and blue once blurred.
    let px = raster.pixel(3, 1).unwrap();
    assert!(px[0] > 0 && px[2] > 0, "{px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn full_matte_keeps_the_subject_sharp() {
    let image = split_image(8, 4);
    let matte = AlphaMatte::from_alpha(8, 4, vec![255; 32]).unwrap();
    let raster = renderer()
        .render(input(&image, Some(&matte), &[], 5.0))
        .unwrap();
    assert_eq!(raster.data(), image.to_rgba8_premul().as_slice());
}

#[test]
fn mismatched_matte_produces_no_frame() {
    let image = split_image(8, 4);
    let matte = AlphaMatte::from_alpha(4, 4, vec![255; 16]).unwrap();
    let err = renderer()
        .render(input(&image, Some(&matte), &[], 0.0))
        .unwrap_err();
    assert!(matches!(err, TextBehindError::Render(_)));
}

#[test]
fn layers_without_fonts_do_not_abort_the_frame() {
    let image = split_image(8, 4);
    let layers = vec![TextLayer::new(LayerId::from("a"))];
    let raster = renderer().render(input(&image, None, &layers, 0.0)).unwrap();
    assert_eq!(raster.width(), 8);
}

#[test]
fn rendering_is_deterministic() {
    let image = split_image(16, 8);
    let matte = AlphaMatte::from_alpha(16, 8, (0..128).map(|i| (i * 2) as u8).collect()).unwrap();
    let layers = vec![TextLayer::new(LayerId::from("a")).with_text("Det")];
    let mut r = LayerStackRenderer::new(&RendererOpts::default());
    let a = r.render(input(&image, Some(&matte), &layers, 3.0)).unwrap();
    let b = r.render(input(&image, Some(&matte), &layers, 3.0)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn png_export_decodes_back_to_the_frame() {
    let image = split_image(6, 3);
    let raster = renderer().render(input(&image, None, &[], 0.0)).unwrap();
    let png = raster.to_png().unwrap();
    let back = decode_image(&png).unwrap();
    assert_eq!(back.rgba8(), raster.to_rgba8_straight().as_slice());
    assert_eq!(raster.pixel(6, 0), None);
}
