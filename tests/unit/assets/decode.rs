use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_straight_alpha() {
    let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 1, 2, 3, 255]).unwrap();
    let decoded = decode_image(&png_bytes(img)).unwrap();
    assert_eq!(decoded.width(), 2);
    assert_eq!(decoded.height(), 1);
    assert_eq!(decoded.rgba8(), &[100, 50, 200, 128, 1, 2, 3, 255]);

    let premul = decoded.to_rgba8_premul();
    assert_eq!(
        &premul[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
    assert_eq!(&premul[4..], &[1, 2, 3, 255]);
}

#[test]
fn decode_garbage_is_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, TextBehindError::Decode(_)));
}

#[test]
fn from_rgba8_rejects_length_mismatch() {
    assert!(DecodedImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(DecodedImage::from_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn encode_png_round_trips_through_decoder() {
    let px = vec![9u8, 8, 7, 255, 0, 0, 0, 0];
    let png = encode_png(1, 2, &px).unwrap();
    let back = decode_image(&png).unwrap();
    assert_eq!(back.rgba8(), px.as_slice());
}
