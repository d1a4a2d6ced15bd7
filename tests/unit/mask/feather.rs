use super::*;

fn lcg_alpha(n: usize, seed: u32) -> Vec<u8> {
    let mut s = seed;
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            match (s >> 24) % 4 {
                0 => 0,
                1 => 255,
                _ => (s >> 8) as u8,
            }
        })
        .collect()
}

#[test]
fn center_soft_pixel_averages_its_ring() {
    let mut raw = vec![255u8; 9];
    raw[4] = 128;
    let m = feather(&raw, 3, 3, 1).unwrap();
    // (128 + 8 * 255) / 9 = 240.9
    assert_eq!(m.get(1, 1), Some(241));
    assert!(m.alpha().iter().enumerate().all(|(i, &a)| i == 4 || a == 255));
}

#[test]
fn confident_pixels_pass_through_for_any_radius() {
    let (w, h) = (9u32, 7u32);
    let raw = lcg_alpha((w * h) as usize, 7);
    for radius in 0..5 {
        let m = feather(&raw, w, h, radius).unwrap();
        for (i, (&src, &dst)) in raw.iter().zip(m.alpha()).enumerate() {
            if src == 0 || src == 255 {
                assert_eq!(src, dst, "pixel {i} radius {radius}");
            }
        }
    }
}

#[test]
fn edge_pixels_stay_within_neighborhood_range() {
    let (w, h) = (8usize, 6usize);
    let raw = lcg_alpha(w * h, 42);
    let r = 2usize;
    let m = feather(&raw, w as u32, h as u32, r as u32).unwrap();
    for y in 0..h {
        for x in 0..w {
            let a = raw[y * w + x];
            if a == 0 || a == 255 {
                continue;
            }
            let mut lo = u8::MAX;
            let mut hi = u8::MIN;
            for ny in y.saturating_sub(r)..=(y + r).min(h - 1) {
                for nx in x.saturating_sub(r)..=(x + r).min(w - 1) {
                    lo = lo.min(raw[ny * w + nx]);
                    hi = hi.max(raw[ny * w + nx]);
                }
            }
            let out = m.alpha()[y * w + x];
            assert!(lo <= out && out <= hi, "({x},{y}) {out} not in [{lo},{hi}]");
        }
    }
}

#[test]
fn radius_zero_is_pass_through() {
    let raw = lcg_alpha(12, 3);
    let m = feather(&raw, 4, 3, 0).unwrap();
    assert_eq!(m.alpha(), raw.as_slice());
}

#[test]
fn window_does_not_wrap_into_adjacent_row() {
    // Row 0 ends with an opaque pixel directly "before" row 1's first pixel in flat order.
    let raw = vec![0, 0, 255, 100, 0, 0];
    let m = feather(&raw, 3, 2, 1).unwrap();
    // In-bounds window of (0,1) is {(0,0),(1,0),(0,1),(1,1)} = 0+0+100+0.
    assert_eq!(m.get(0, 1), Some(25));
}

#[test]
fn corner_window_counts_only_in_bounds_pixels() {
    let raw = vec![200, 100, 100, 100];
    let m = feather(&raw, 2, 2, 3).unwrap();
    assert_eq!(m.get(0, 0), Some(125));
}

#[test]
fn feather_rejects_bad_lengths() {
    assert!(feather(&[0; 5], 2, 2, 1).is_err());
    assert!(feather(&[], 0, 0, 1).is_err());
}

#[test]
fn build_matte_from_boolean_signal_is_hard() {
    let signal = SegmentationSignal::Boolean(vec![true, false, false, true]);
    let m = build_matte(&signal, 2, 2, &MaskOpts::default()).unwrap();
    assert_eq!(m.alpha(), &[255, 0, 0, 255]);
}

#[test]
fn build_matte_feathers_soft_probabilities() {
    let signal = SegmentationSignal::Probability(vec![1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let opts = MaskOpts::default().with_feather_radius(1);
    let m = build_matte(&signal, 3, 3, &opts).unwrap();
    assert_eq!(m.get(0, 1), Some(((128u32 + 5 * 255 + 3) / 6) as u8));

    let hard = build_matte(&signal, 3, 3, &opts.with_probability_threshold(Some(0.6))).unwrap();
    assert_eq!(hard.get(0, 1), Some(0));
}

#[test]
fn matte_get_is_bounds_checked() {
    let m = AlphaMatte::from_alpha(2, 1, vec![1, 2]).unwrap();
    assert_eq!(m.get(1, 0), Some(2));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.get(0, 1), None);
}
