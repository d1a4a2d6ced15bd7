use super::*;

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 4).is_err());
    assert!(Canvas::new(4, 0).is_err());
    let c = Canvas::new(3, 2).unwrap();
    assert_eq!(c.pixel_count(), 6);
    assert_eq!(c.rgba8_len(), 24);
}

#[test]
fn anchor_maps_percentages_to_pixels() {
    let c = Canvas::new(200, 100).unwrap();
    assert_eq!(c.anchor(50.0, 50.0), Point::new(100.0, 50.0));
    assert_eq!(c.anchor(0.0, 100.0), Point::new(0.0, 100.0));
}

